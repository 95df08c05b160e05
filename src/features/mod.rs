/// 健康检查
pub mod health;

/// 图片上传转发
pub mod upload;
