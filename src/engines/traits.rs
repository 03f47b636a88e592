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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// 引擎错误类型
///
/// 抓取失败在任务边界被分类吸收；协调器不会因单个任务的失败
/// 中止作业，也不会在同一轮内重试。
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求超时
    #[error("timeout")]
    Timeout,
    /// 非2xx状态码
    #[error("http status {0}")]
    Http(u16),
    /// 网络层错误
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EngineError::Timeout
        } else if let Some(status) = e.status() {
            EngineError::Http(status.as_u16())
        } else {
            EngineError::Network(e.to_string())
        }
    }
}

/// 抓取请求
pub struct FetchRequest {
    /// 目标URL（已规范化）
    pub url: Url,
    /// 单次请求超时时间
    pub timeout: Duration,
}

/// 抓取响应
#[derive(Debug)]
pub struct FetchResponse {
    /// HTTP状态码
    pub status_code: u16,
    /// 响应正文
    pub body: String,
    /// 内容类型
    pub content_type: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 抓取引擎特质
///
/// 对外部HTTP协作方的窄接口；除网络调用外没有其他副作用。
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// 执行抓取
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
