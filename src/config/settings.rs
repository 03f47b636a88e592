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

use crate::domain::models::job::MergePolicy;
use crate::domain::services::crawl_service::CoordinatorSettings;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、爬取、评分、LLM和存储等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 爬取配置
    pub crawl: CrawlSettings,
    /// 评分配置
    pub scoring: ScoringSettings,
    /// LLM配置
    pub llm: LlmSettings,
    /// 存储配置
    pub storage: StorageSettings,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 指标导出配置设置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// Prometheus导出器监听主机地址
    pub host: String,
    /// Prometheus导出器监听端口
    pub port: u16,
}

/// 爬取配置设置
#[derive(Debug, Deserialize)]
pub struct CrawlSettings {
    /// 单次抓取超时时间（秒）
    pub fetch_timeout_secs: u64,
    /// 全局在途抓取任务上限
    pub max_in_flight: usize,
    /// 单域名并发抓取上限
    pub per_domain_limit: usize,
    /// 单页最多跟进的子链接数
    pub max_follow_per_page: usize,
    /// 是否遵循robots.txt
    pub respect_robots: bool,
    /// 抓取使用的User-Agent
    pub user_agent: String,
}

/// 评分配置设置
#[derive(Debug, Deserialize)]
pub struct ScoringSettings {
    /// 规则分数与语义分数的合并策略 (override, blend)
    pub merge_policy: MergePolicy,
}

/// LLM配置设置
#[derive(Debug, Deserialize)]
pub struct LlmSettings {
    /// API密钥（未设置时语义精排被禁用）
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// API基础URL
    pub api_base_url: String,
    /// 单批次链接数上限
    pub batch_size: usize,
    /// 每分钟请求数上限
    pub requests_per_minute: u32,
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 送入语义精排的边界带下限
    pub band_low: f64,
    /// 送入语义精排的边界带上限
    pub band_high: f64,
}

/// 存储配置设置
#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    /// 存储类型 (sqlite, memory)
    pub backend: String,
    /// SQLite数据库路径 (当 backend=sqlite 时使用)
    pub sqlite_path: Option<String>,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("metrics.host", "0.0.0.0")?
            .set_default("metrics.port", 9000)?
            // Default crawl settings
            .set_default("crawl.fetch_timeout_secs", 10)?
            .set_default("crawl.max_in_flight", 16)?
            .set_default("crawl.per_domain_limit", 4)?
            .set_default("crawl.max_follow_per_page", 5)?
            .set_default("crawl.respect_robots", true)?
            .set_default("crawl.user_agent", "linkscout/0.1")?
            // Default scoring settings
            .set_default("scoring.merge_policy", "override")?
            // Default LLM settings
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.batch_size", 30)?
            .set_default("llm.requests_per_minute", 60)?
            .set_default("llm.timeout_secs", 30)?
            .set_default("llm.band_low", 0.3)?
            .set_default("llm.band_high", 0.7)?
            // Default storage settings
            .set_default("storage.backend", "memory")?
            .set_default("storage.sqlite_path", "./linkscout.db")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("LINKSCOUT").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 由配置推导协调器运行参数
    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            fetch_timeout: Duration::from_secs(self.crawl.fetch_timeout_secs),
            max_in_flight: self.crawl.max_in_flight,
            max_follow_per_page: self.crawl.max_follow_per_page,
            band_low: self.llm.band_low,
            band_high: self.llm.band_high,
            merge_policy: self.scoring.merge_policy,
            user_agent: self.crawl.user_agent.clone(),
        }
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
