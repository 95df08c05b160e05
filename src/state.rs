use std::sync::Arc;

use crate::features::upload::client::ImageHostClient;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 图床客户端（启动时按配置构建一次，后续请求复用连接池）
    pub uploader: Arc<ImageHostClient>,
    /// 编码后 Data URL 的长度上限（字符数，约 5MB 的近似代理）
    pub max_data_url_len: usize,
}
