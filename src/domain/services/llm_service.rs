// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{info, warn};

/// 待精排的边界链接
#[derive(Debug, Clone)]
pub struct BorderlineLink {
    pub url: String,
    pub anchor_text: String,
    pub context: String,
    pub rule_score: f64,
}

/// 语义分类结论
#[derive(Debug, Clone)]
pub struct LlmVerdict {
    pub score: f64,
    pub reason: Option<String>,
}

/// 语义分类器接口
///
/// 协调器对启用与禁用两个变体一视同仁：禁用变体直接返回空
/// 结论，任何外部失败都以"缺少结论"的形式开放失败，绝不向
/// 协调器抛出致命错误。
#[async_trait]
pub trait LinkClassifier: Send + Sync {
    /// 对一批边界链接做语义精排
    ///
    /// # 返回值
    ///
    /// URL到语义结论的映射；失败的批次对应的条目缺省
    async fn refine(
        &self,
        batch: &[BorderlineLink],
        keywords: &[String],
    ) -> Result<HashMap<String, LlmVerdict>>;

    /// 分类器是否启用
    fn is_enabled(&self) -> bool {
        true
    }
}

/// 禁用态的空分类器
pub struct NoopClassifier;

#[async_trait]
impl LinkClassifier for NoopClassifier {
    async fn refine(
        &self,
        _batch: &[BorderlineLink],
        _keywords: &[String],
    ) -> Result<HashMap<String, LlmVerdict>> {
        Ok(HashMap::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// 语义精排网关
///
/// 将边界链接分批发往chat-completions端点，出站批次由令牌桶
/// 限流。单个批次失败时记录日志并跳过该批，其余批次继续。
pub struct OpenAiClassifier {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base_url: String,
    batch_size: usize,
    request_timeout: Duration,
    limiter: DefaultDirectRateLimiter,
}

impl OpenAiClassifier {
    pub fn new(
        api_key: String,
        model: String,
        api_base_url: String,
        batch_size: usize,
        requests_per_minute: u32,
        request_timeout: Duration,
    ) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            api_base_url,
            batch_size: batch_size.max(1),
            request_timeout,
            limiter: RateLimiter::direct(Quota::per_minute(rpm)),
        }
    }

    async fn classify_batch(
        &self,
        batch: &[BorderlineLink],
        keywords: &[String],
    ) -> Result<HashMap<String, LlmVerdict>> {
        let prompt = build_prompt(batch, keywords);

        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an AI that evaluates the relevance of links based on specific criteria."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": 0.2,
            "max_tokens": 2000
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.request_timeout)
            .json(&request_body)
            .send()
            .await
            .context("failed to send classification request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("classification API returned {}: {}", status, error_text);
        }

        let body: Value = response
            .json()
            .await
            .context("failed to parse classification response")?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .context("malformed classification response")?;

        Ok(parse_verdicts(batch, content))
    }
}

#[async_trait]
impl LinkClassifier for OpenAiClassifier {
    /// 分批精排边界链接
    ///
    /// 每个出站批次先经过令牌桶；失败批次仅产生一条警告日志，
    /// 其链接保留规则分数。
    async fn refine(
        &self,
        batch: &[BorderlineLink],
        keywords: &[String],
    ) -> Result<HashMap<String, LlmVerdict>> {
        let mut verdicts = HashMap::new();

        for (idx, chunk) in batch.chunks(self.batch_size).enumerate() {
            self.limiter.until_ready().await;
            metrics::counter!("linkscout_llm_batches").increment(1);

            match self.classify_batch(chunk, keywords).await {
                Ok(chunk_verdicts) => {
                    info!(
                        batch = idx,
                        links = chunk.len(),
                        scored = chunk_verdicts.len(),
                        "classification batch completed"
                    );
                    verdicts.extend(chunk_verdicts);
                }
                Err(e) => {
                    metrics::counter!("linkscout_llm_batch_failures").increment(1);
                    warn!(batch = idx, error = %e, "classification batch failed, keeping rule scores");
                }
            }
        }

        Ok(verdicts)
    }
}

/// 构建批量分类提示词
fn build_prompt(batch: &[BorderlineLink], keywords: &[String]) -> String {
    let keywords_str = keywords.join(", ");
    let mut prompt = format!(
        "Evaluate the following links based on their relevance to these keywords: {}.\n\
         Focus on identifying links that might lead to important documents like budgets, \
         financial reports (ACFR), or contact information for financial or administrative staff.\n\n\
         For each link, provide a relevance score between 0.0 and 1.0, where:\n\
         - 1.0 = Extremely relevant (direct link to target content)\n\
         - 0.7-0.9 = Highly relevant (likely leads to target content with 1-2 clicks)\n\
         - 0.4-0.6 = Moderately relevant (might lead to target content)\n\
         - 0.0-0.3 = Low relevance (unlikely to lead to target content)\n\n\
         Links to evaluate:\n",
        keywords_str
    );

    for (i, link) in batch.iter().enumerate() {
        prompt.push_str(&format!(
            "\nLink {}:\nURL: {}\nText: {}\nContext: {}\n",
            i + 1,
            link.url,
            link.anchor_text,
            link.context
        ));
    }

    prompt.push_str(
        "\nRespond in this format for each link (replace X with the link number):\n\
         Link X: [score] - [brief reason for score]",
    );

    prompt
}

/// 解析分类响应
///
/// 响应按行解析，格式为`Link N: <score> - <reason>`；无法解析
/// 或越界的行直接跳过，对应链接保留规则分数。
fn parse_verdicts(batch: &[BorderlineLink], response: &str) -> HashMap<String, LlmVerdict> {
    let mut verdicts = HashMap::new();

    for line in response.lines() {
        let line = line.trim();
        if !line.starts_with("Link ") {
            continue;
        }
        let Some((link_part, rest)) = line.split_once(':') else {
            continue;
        };
        let Ok(link_num) = link_part.trim_start_matches("Link ").trim().parse::<usize>() else {
            continue;
        };
        if link_num == 0 || link_num > batch.len() {
            continue;
        }

        let rest = rest.trim();
        let (score_str, reason) = match rest.split_once(" - ") {
            Some((score, reason)) => (score.trim(), Some(reason.trim().to_string())),
            None => (rest, None),
        };
        let Ok(score) = score_str.trim_matches(['[', ']']).parse::<f64>() else {
            continue;
        };
        if !(0.0..=1.0).contains(&score) {
            continue;
        }

        verdicts.insert(
            batch[link_num - 1].url.clone(),
            LlmVerdict { score, reason },
        );
    }

    verdicts
}
