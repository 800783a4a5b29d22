//! HTTP 请求服务
//!
//! 获取外部资源

use std::time::Duration;

use async_trait::async_trait;

use crate::models::HttpSettings;
use crate::utils::error::{AppError, AppResult};

/// 获取 URL 内容，任何失败都返回 `None`
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}

/// 基于共享 `reqwest::Client` 的 [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// 按设置创建客户端（超时、User-Agent）
    pub fn new(settings: &HttpSettings) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| AppError::Config(format!("无法创建 HTTP 客户端: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("请求失败 {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("请求 {} 返回状态码 {}", url, status.as_u16());
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!("无法读取响应内容 {}: {}", url, e);
                None
            }
        }
    }
}
