use serde::{Deserialize, Serialize};

/// 上传请求体
///
/// 注意：请求体实际由 handler 手动解析（见 `handler::parse_image_data`），
/// 因为契约要求区分“JSON 非法”与“缺少 imageData”两种固定文案；
/// 本结构体用于 OpenAPI 文档与调用方 SDK 生成。
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UploadRequest {
    /// Data URL 形式的图片内容（`data:image/<subtype>;base64,<payload>`）
    #[serde(rename = "imageData")]
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub image_data: String,
}

/// 上传成功响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// 图床返回的 HTTPS 地址（secure_url）
    #[serde(rename = "imageUrl")]
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/v1/sample.png")]
    pub image_url: String,
}
