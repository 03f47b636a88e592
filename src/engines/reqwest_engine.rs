// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engines::traits::{EngineError, FetchEngine, FetchRequest, FetchResponse};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎。每个域名持有一个信号量作为
/// 并发上限，单个缓慢或异常的站点不会饿死整个爬取。
pub struct ReqwestEngine {
    client: reqwest::Client,
    domain_permits: DashMap<String, Arc<Semaphore>>,
    per_domain_limit: usize,
}

impl ReqwestEngine {
    /// 创建新的抓取引擎实例
    ///
    /// # 参数
    ///
    /// * `per_domain_limit` - 每域名最大并发请求数
    /// * `user_agent` - 请求使用的User-Agent
    pub fn new(per_domain_limit: usize, user_agent: &str) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            domain_permits: DashMap::new(),
            per_domain_limit,
        })
    }

    fn domain_semaphore(&self, host: &str) -> Arc<Semaphore> {
        self.domain_permits
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_domain_limit)))
            .clone()
    }
}

#[async_trait]
impl FetchEngine for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// 超时与非2xx状态返回分类错误；在同一轮爬取内失败是终态，
    /// 重试属于上层的策略而非引擎的保证。
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError> {
        let host = request.url.host_str().unwrap_or_default().to_string();
        let semaphore = self.domain_semaphore(&host);
        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let start = Instant::now();
        let response = self
            .client
            .get(request.url.clone())
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Http(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        let body = response.text().await?;

        Ok(FetchResponse {
            status_code: status.as_u16(),
            body,
            content_type,
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
