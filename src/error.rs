use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// 应用统一错误类型
///
/// 上传接口的对外契约是固定的 text/plain 文案（见 `Display` 实现），
/// 因此错误渲染只暴露固定文本；上游细节仅进入日志，不回传给调用方。
#[derive(Error, Debug)]
pub enum AppError {
    /// 上传路由仅接受 POST
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// 请求体不是合法 JSON
    #[error("Invalid JSON in request body")]
    InvalidJson,

    /// 缺少 imageData 字段，或字段不是字符串
    #[error("Missing imageData")]
    MissingImageData,

    /// imageData 不是 `data:image/` 开头的 Data URL
    #[error("Invalid image data format")]
    InvalidImageFormat,

    /// 编码后的 Data URL 超过配置的长度上限
    #[error("Image is too large")]
    ImageTooLarge,

    /// 图床调用完成但失败：非成功状态码，或响应缺少 secure_url
    #[error("Image upload failed")]
    UploadFailed(String),

    /// 传输层失败：网络错误、响应体无法按 JSON 解析等
    #[error("Server error during image upload")]
    Upstream(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidJson
            | AppError::MissingImageData
            | AppError::InvalidImageFormat
            | AppError::ImageTooLarge => StatusCode::BAD_REQUEST,
            AppError::UploadFailed(_) | AppError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = crate::request_id::current_request_id();
        match &self {
            // 上游问题：细节只进日志，调用方拿到统一文案
            AppError::UploadFailed(detail) => {
                tracing::error!(?request_id, %detail, "图床上传失败");
            }
            AppError::Upstream(detail) => {
                tracing::error!(?request_id, %detail, "图床请求异常");
            }
            other => {
                tracing::warn!(?request_id, error = %other, "请求校验未通过");
            }
        }

        let status = self.status_code();
        let mut res = (status, self.to_string()).into_response();
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}
