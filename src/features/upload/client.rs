use std::time::Duration;

use reqwest::multipart::Form;
use serde_json::Value;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::AppError;

/// 上传请求超时。5MB 级别的 Data URL 在慢速链路上可能耗时较久，
/// 给一个宽松上限避免无限等待。
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(90);

/// 图床客户端
///
/// cloud_name / upload_preset 在构建时显式传入并固化为上传端点与表单字段，
/// 请求路径上不再读取任何全局配置，便于单测注入 mock 地址。
#[derive(Clone)]
pub struct ImageHostClient {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl ImageHostClient {
    pub fn new(cfg: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;

        let upload_url = format!(
            "{}/v1_1/{}/image/upload",
            cfg.api_base.trim_end_matches('/'),
            cfg.cloud_name
        );

        Ok(Self {
            client,
            upload_url,
            upload_preset: cfg.upload_preset.clone(),
        })
    }

    /// 上传端点（供启动日志展示）
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// 将完整的 Data URL 作为 multipart 表单转发给图床，返回 secure_url。
    ///
    /// 错误映射：
    /// - 发送失败 / 响应体不是 JSON → `AppError::Upstream`（对外 500，统一文案）
    /// - 非成功状态码 / 缺少 secure_url → `AppError::UploadFailed`（对外 500，统一文案）
    pub async fn upload_data_url(&self, data_url: &str) -> Result<String, AppError> {
        let form = Form::new()
            .text("file", data_url.to_string())
            .text("upload_preset", self.upload_preset.clone());

        let resp = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("图床请求失败: {}", e)))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("解析图床响应失败: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::UploadFailed(format!("HTTP {}: {}", status, body)));
        }

        match body.get("secure_url").and_then(Value::as_str) {
            Some(url) => {
                debug!(%status, url, "图床上传成功");
                Ok(url.to_string())
            }
            None => Err(AppError::UploadFailed(format!(
                "响应缺少 secure_url: {}",
                body
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ImageHostClient;
    use crate::config::ProviderConfig;

    #[test]
    fn upload_url_follows_cloudinary_path_shape() {
        let client = ImageHostClient::new(&ProviderConfig {
            api_base: "https://api.cloudinary.com/".to_string(),
            cloud_name: "demo".to_string(),
            upload_preset: "unsigned".to_string(),
        })
        .expect("build client");

        assert_eq!(
            client.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }
}
