// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

const ROBOTS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// 爬取策略接口
///
/// 协调器在入队前通过该钩子询问一个URL是否允许抓取。
#[async_trait]
pub trait CrawlPolicyTrait: Send + Sync {
    /// 检查URL是否被允许访问
    async fn is_allowed(&self, url_str: &str, user_agent: &str) -> Result<bool>;
}

/// 放行所有URL的默认策略
pub struct AllowAllPolicy;

#[async_trait]
impl CrawlPolicyTrait for AllowAllPolicy {
    async fn is_allowed(&self, _url_str: &str, _user_agent: &str) -> Result<bool> {
        Ok(true)
    }
}

/// 缓存的Robots.txt内容
#[derive(Clone)]
struct CachedRobots {
    content: String,
    expires_at: Instant,
}

/// Robots.txt检查器
///
/// 按origin抓取并缓存robots.txt，通过`robotstxt`匹配器判定路径
/// 是否允许。抓取robots.txt失败时放行，绝不因此阻塞作业。
pub struct RobotsChecker {
    client: Client,
    memory_cache: Mutex<HashMap<String, CachedRobots>>,
}

impl Default for RobotsChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotsChecker {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            memory_cache: Mutex::new(HashMap::new()),
        }
    }

    async fn get_robots_content(&self, url: &Url) -> Result<String> {
        let origin = format!(
            "{}://{}",
            url.scheme(),
            url.host_str().unwrap_or_default()
        );

        {
            let cache = self.memory_cache.lock().await;
            if let Some(cached) = cache.get(&origin) {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.content.clone());
                }
            }
        }

        let robots_url = format!("{}/robots.txt", origin);
        let content = match self.client.get(&robots_url).send().await {
            Ok(resp) if resp.status().is_success() => resp.text().await.unwrap_or_default(),
            // Missing or unreachable robots.txt means no restrictions
            _ => String::new(),
        };

        let mut cache = self.memory_cache.lock().await;
        cache.insert(
            origin,
            CachedRobots {
                content: content.clone(),
                expires_at: Instant::now() + ROBOTS_CACHE_TTL,
            },
        );

        Ok(content)
    }
}

#[async_trait]
impl CrawlPolicyTrait for RobotsChecker {
    async fn is_allowed(&self, url_str: &str, user_agent: &str) -> Result<bool> {
        let url = Url::parse(url_str)?;
        let content = self.get_robots_content(&url).await?;
        if content.is_empty() {
            return Ok(true);
        }
        let mut matcher = DefaultMatcher::default();
        Ok(matcher.one_agent_allowed_by_robots(&content, user_agent, url.as_str()))
    }
}
