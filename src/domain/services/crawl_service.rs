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

use crate::domain::models::job::{CrawlConfig, JobState, MergePolicy};
use crate::domain::models::link::{CrawlTask, PageContext, ScoredLink};
use crate::domain::repositories::link_repository::LinkRepository;
use crate::domain::services::aggregator::ResultAggregator;
use crate::domain::services::extraction_service::LinkExtractor;
use crate::domain::services::llm_service::{BorderlineLink, LinkClassifier};
use crate::domain::services::relevance_scorer::RelevanceScorer;
use crate::engines::traits::{FetchEngine, FetchRequest};
use crate::utils::errors::CrawlError;
use crate::utils::robots::CrawlPolicyTrait;
use crate::utils::url_utils::{self, VisitedSet};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// 协调器配置
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// 单次抓取超时
    pub fetch_timeout: Duration,
    /// 全局在途任务上限
    pub max_in_flight: usize,
    /// 单页最多跟进的子链接数
    pub max_follow_per_page: usize,
    /// 语义精排边界带下限
    pub band_low: f64,
    /// 语义精排边界带上限
    pub band_high: f64,
    /// 分数合并策略
    pub merge_policy: MergePolicy,
    /// 爬虫User-Agent
    pub user_agent: String,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            max_in_flight: 16,
            max_follow_per_page: 5,
            band_low: 0.3,
            band_high: 0.7,
            merge_policy: MergePolicy::Override,
            user_agent: "Mozilla/5.0 (compatible; linkscout/0.1)".to_string(),
        }
    }
}

/// 单个任务的处理结果
struct TaskOutcome {
    depth: u32,
    succeeded: bool,
    links: Vec<ScoredLink>,
}

/// 爬取协调器
///
/// 驱动逐层的广度优先遍历：深度d的所有任务抓取、提取、打分
/// 完毕后才放行深度d+1，一次只保留一层的前沿，层内由有界工作
/// 池并行处理。每个任务的失败都在任务边界被吸收；只有深度0的
/// 种子全部失败才升级为作业失败。
pub struct CrawlCoordinator<R: LinkRepository> {
    engine: Arc<dyn FetchEngine>,
    classifier: Arc<dyn LinkClassifier>,
    policy: Arc<dyn CrawlPolicyTrait>,
    repo: Arc<R>,
    settings: CoordinatorSettings,
}

impl<R: LinkRepository> CrawlCoordinator<R> {
    pub fn new(
        engine: Arc<dyn FetchEngine>,
        classifier: Arc<dyn LinkClassifier>,
        policy: Arc<dyn CrawlPolicyTrait>,
        repo: Arc<R>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            engine,
            classifier,
            policy,
            repo,
            settings,
        }
    }

    /// 执行一次完整的爬取作业
    ///
    /// # 参数
    ///
    /// * `config` - 作业配置
    /// * `state` - 运行时共享状态（计数器与取消信号）
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 作业完成（允许部分分支失败）
    /// * `Err(CrawlError::JobFailure)` - 所有种子任务均失败
    /// * `Err(CrawlError::Cancelled)` - 作业在任何种子完成前被取消
    pub async fn run(&self, config: &CrawlConfig, state: &JobState) -> Result<(), CrawlError> {
        let scorer = RelevanceScorer::new(&config.keywords);
        let visited = VisitedSet::new();
        info!(
            engine = self.engine.name(),
            seeds = config.seed_urls.len(),
            max_depth = config.max_depth,
            "starting crawl job"
        );

        let mut frontier: Vec<CrawlTask> = Vec::new();
        for raw in &config.seed_urls {
            match url_utils::normalize(raw, None) {
                Ok(url) => {
                    if visited.mark_visited(&url) {
                        frontier.push(CrawlTask {
                            url,
                            depth: 0,
                            parent_url: None,
                        });
                    }
                }
                Err(e) => warn!(seed = %raw, error = %e, "invalid seed url dropped"),
            }
        }
        if frontier.is_empty() {
            return Err(CrawlError::JobFailure);
        }

        let mut collected: Vec<ScoredLink> = Vec::new();
        let mut seed_successes = 0usize;

        while !frontier.is_empty() {
            if state.is_cancelled() {
                info!("cancellation requested, draining current results");
                break;
            }

            let depth = frontier[0].depth;
            let tasks = std::mem::take(&mut frontier);
            info!(depth, tasks = tasks.len(), "processing depth level");

            let outcomes: Vec<TaskOutcome> = stream::iter(tasks)
                .map(|task| self.process_task(task, &scorer, config, state))
                .buffer_unordered(self.settings.max_in_flight)
                .collect()
                .await;

            // The level is fully drained here; this loop is the single
            // mutation point that admits depth+1 tasks.
            for outcome in outcomes {
                if outcome.depth == 0 && outcome.succeeded {
                    seed_successes += 1;
                }

                let mut followed = 0usize;
                for link in outcome.links {
                    if link.final_score >= config.min_score {
                        collected.push(link.clone());
                    }

                    if state.is_cancelled() || followed >= self.settings.max_follow_per_page {
                        continue;
                    }
                    if link.depth > config.max_depth || !link.classification.is_traversable() {
                        continue;
                    }
                    if link.final_score < config.follow_threshold() {
                        continue;
                    }
                    let Ok(url) = Url::parse(&link.url) else {
                        continue;
                    };
                    if !visited.mark_visited(&url) {
                        continue;
                    }

                    frontier.push(CrawlTask {
                        url,
                        depth: link.depth,
                        parent_url: Url::parse(&link.source_url).ok(),
                    });
                    followed += 1;
                }
            }
        }

        let finalized = ResultAggregator::finalize(collected);
        for link in &finalized {
            match self.repo.upsert(link).await {
                Ok(()) => {
                    state.links_stored.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("linkscout_links_stored").increment(1);
                }
                Err(e) => warn!(url = %link.url, error = %e, "failed to store link"),
            }
        }
        info!(
            stored = finalized.len(),
            pages = state.pages_fetched.load(Ordering::Relaxed),
            "crawl finished"
        );

        if seed_successes == 0 {
            if state.is_cancelled() {
                return Err(CrawlError::Cancelled);
            }
            return Err(CrawlError::JobFailure);
        }
        Ok(())
    }

    /// 处理单个爬取任务：抓取 → 提取 → 打分 → 可选语义精排
    async fn process_task(
        &self,
        task: CrawlTask,
        scorer: &RelevanceScorer,
        config: &CrawlConfig,
        state: &JobState,
    ) -> TaskOutcome {
        let depth = task.depth;

        match self
            .policy
            .is_allowed(task.url.as_str(), &self.settings.user_agent)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                debug!(url = %task.url, "skipped by crawl policy");
                return TaskOutcome {
                    depth,
                    succeeded: true,
                    links: Vec::new(),
                };
            }
            // Policy errors never block the crawl
            Err(e) => warn!(url = %task.url, error = %e, "crawl policy check failed, proceeding"),
        }

        let request = FetchRequest {
            url: task.url.clone(),
            timeout: self.settings.fetch_timeout,
        };
        let response = match self.engine.fetch(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %task.url, depth, error = %e, "fetch failed");
                state.failed_fetches.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("linkscout_fetch_failures").increment(1);
                return TaskOutcome {
                    depth,
                    succeeded: false,
                    links: Vec::new(),
                };
            }
        };
        state.pages_fetched.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("linkscout_pages_fetched").increment(1);

        let page = PageContext {
            fetched_at: Utc::now(),
            status_code: response.status_code,
            raw_links: LinkExtractor::extract(&response.body, &task.url, config.max_links_per_page),
            url: task.url.clone(),
        };
        debug!(url = %page.url, status = page.status_code, links = page.raw_links.len(), "page extracted");

        let mut links: Vec<ScoredLink> = page
            .raw_links
            .iter()
            .map(|candidate| {
                let rule = scorer.score(&candidate.url, &candidate.anchor_text, &candidate.context);
                ScoredLink {
                    url: candidate.url.to_string(),
                    source_url: task.url.to_string(),
                    anchor_text: candidate.anchor_text.clone(),
                    depth: depth + 1,
                    rule_score: rule.score,
                    llm_score: None,
                    final_score: rule.score,
                    matched_keywords: rule.matched_keywords,
                    classification: rule.classification,
                    llm_reason: None,
                    discovered_at: page.fetched_at,
                }
            })
            .collect();

        if config.use_llm && self.classifier.is_enabled() {
            self.refine_borderline(&mut links, &page, config, state).await;
        }

        for link in links.iter_mut() {
            link.final_score = self.settings.merge_policy.merge(link.rule_score, link.llm_score);
        }
        state
            .links_found
            .fetch_add(links.len() as u64, Ordering::Relaxed);

        TaskOutcome {
            depth,
            succeeded: true,
            links,
        }
    }

    /// 语义精排边界带内的链接
    ///
    /// 置信度明确的高分或低分链接完全跳过这一阶段，限制外部
    /// 调用量；没有拿到结论的链接保留规则分数。
    async fn refine_borderline(
        &self,
        links: &mut [ScoredLink],
        page: &PageContext,
        config: &CrawlConfig,
        state: &JobState,
    ) {
        let in_band =
            |score: f64| score >= self.settings.band_low && score <= self.settings.band_high;

        let borderline: Vec<BorderlineLink> = links
            .iter()
            .zip(page.raw_links.iter())
            .filter(|(link, _)| in_band(link.rule_score))
            .map(|(link, candidate)| BorderlineLink {
                url: link.url.clone(),
                anchor_text: candidate.anchor_text.clone(),
                context: candidate.context.clone(),
                rule_score: link.rule_score,
            })
            .collect();
        if borderline.is_empty() {
            return;
        }

        match self.classifier.refine(&borderline, &config.keywords).await {
            Ok(verdicts) => {
                for link in links.iter_mut().filter(|l| in_band(l.rule_score)) {
                    match verdicts.get(&link.url) {
                        Some(verdict) => {
                            link.llm_score = Some(verdict.score);
                            link.llm_reason = verdict.reason.clone();
                            state.llm_refined.fetch_add(1, Ordering::Relaxed);
                        }
                        None => {
                            state.llm_fallbacks.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            }
            Err(e) => {
                warn!(url = %page.url, error = %e, "classification unavailable, keeping rule scores");
                state
                    .llm_fallbacks
                    .fetch_add(borderline.len() as u64, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
#[path = "crawl_service_test.rs"]
mod tests;
