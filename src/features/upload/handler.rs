use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

use super::models::UploadResponse;

/// 合法图片 Data URL 的前缀（`data:image/<subtype>;base64,...`）
const DATA_URL_IMAGE_PREFIX: &str = "data:image/";

pub fn create_upload_router() -> Router<AppState> {
    Router::new().route(
        "/upload",
        // 非 POST 方法走 fallback，保证 405 带契约文案而不是 axum 默认空响应体
        post(upload_image).fallback(method_not_allowed),
    )
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// 按契约顺序校验请求体，返回其中的 Data URL。
///
/// 每一步短路返回固定文案对应的错误：
/// 1. JSON 解析失败 → `InvalidJson`
/// 2. imageData 缺失或不是字符串 → `MissingImageData`
/// 3. 前缀不是 `data:image/` → `InvalidImageFormat`
/// 4. 编码串长度超过上限 → `ImageTooLarge`（长度按编码后的字符数度量）
fn parse_image_data(body: &[u8], max_len: usize) -> Result<String, AppError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| AppError::InvalidJson)?;

    let image_data = payload
        .get("imageData")
        .and_then(Value::as_str)
        .ok_or(AppError::MissingImageData)?;

    if !image_data.starts_with(DATA_URL_IMAGE_PREFIX) {
        return Err(AppError::InvalidImageFormat);
    }

    if image_data.len() > max_len {
        return Err(AppError::ImageTooLarge);
    }

    Ok(image_data.to_string())
}

#[utoipa::path(
    post,
    path = "/upload",
    summary = "上传图片",
    description = "接收 Data URL（data:image/...;base64,...）形式的图片，转发至图床并返回托管后的 HTTPS 地址。失败路径返回固定的 text/plain 文案。",
    request_body = super::models::UploadRequest,
    responses(
        (status = 200, description = "上传成功", body = UploadResponse),
        (status = 400, description = "请求校验失败（Invalid JSON in request body / Missing imageData / Invalid image data format / Image is too large）", body = String, content_type = "text/plain"),
        (status = 405, description = "Method Not Allowed", body = String, content_type = "text/plain"),
        (status = 500, description = "图床上传失败（Image upload failed / Server error during image upload）", body = String, content_type = "text/plain")
    ),
    tag = "Upload"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let image_data = parse_image_data(&body, state.max_data_url_len)?;
    debug!(encoded_len = image_data.len(), "收到图片上传请求");

    let secure_url = state.uploader.upload_data_url(&image_data).await?;

    Ok((
        StatusCode::OK,
        Json(UploadResponse {
            image_url: secure_url,
        }),
    ))
}
