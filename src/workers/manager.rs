// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{CrawlConfig, CrawlJob, JobState, JobStatus};
use crate::domain::repositories::link_repository::LinkRepository;
use crate::domain::services::crawl_service::CrawlCoordinator;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// 单个作业的管理条目
struct JobEntry {
    job: Arc<RwLock<CrawlJob>>,
    state: Arc<JobState>,
}

/// 作业管理器
///
/// 负责作业的提交、状态查询和取消。每个作业在独立的tokio任务中
/// 运行协调器，管理器仅保存句柄与共享计数器，查询从不阻塞爬取。
pub struct JobManager<R: LinkRepository + 'static> {
    coordinator: Arc<CrawlCoordinator<R>>,
    jobs: DashMap<Uuid, JobEntry>,
}

impl<R: LinkRepository + 'static> JobManager<R> {
    /// 创建新的作业管理器实例
    pub fn new(coordinator: Arc<CrawlCoordinator<R>>) -> Self {
        Self {
            coordinator,
            jobs: DashMap::new(),
        }
    }

    /// 提交新作业并立即返回作业ID
    ///
    /// 作业体在后台任务中运行，终态与最终统计在完成时写回。
    ///
    /// # 参数
    ///
    /// * `config` - 作业配置
    ///
    /// # 返回值
    ///
    /// 新作业的ID
    pub fn submit(&self, config: CrawlConfig) -> Uuid {
        let job = CrawlJob::new(config.clone());
        let id = job.id;
        let job = Arc::new(RwLock::new(job));
        let state = Arc::new(JobState::new());
        self.jobs.insert(
            id,
            JobEntry {
                job: job.clone(),
                state: state.clone(),
            },
        );

        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            {
                let mut guard = job.write().await;
                guard.status = JobStatus::Running;
                guard.started_at = Some(Utc::now());
            }
            info!(job_id = %id, seeds = config.seed_urls.len(), "crawl job started");

            let outcome = coordinator.run(&config, &state).await;

            let mut guard = job.write().await;
            guard.stats = state.snapshot();
            guard.finished_at = Some(Utc::now());
            match outcome {
                Ok(()) => {
                    guard.status = JobStatus::Done;
                    info!(
                        job_id = %id,
                        pages = guard.stats.pages_fetched,
                        stored = guard.stats.links_stored,
                        "crawl job finished"
                    );
                }
                Err(e) => {
                    guard.status = JobStatus::Failed;
                    guard.error = Some(e.to_string());
                    warn!(job_id = %id, error = %e, "crawl job failed");
                }
            }
        });

        id
    }

    /// 查询作业当前快照
    ///
    /// 运行中的作业返回实时计数器，终态作业返回落盘的最终统计。
    pub async fn status(&self, id: &Uuid) -> Option<CrawlJob> {
        let entry = self.jobs.get(id)?;
        let mut job = entry.job.read().await.clone();
        if job.status == JobStatus::Running {
            job.stats = entry.state.snapshot();
        }
        Some(job)
    }

    /// 请求取消作业
    ///
    /// 取消是协作式的：在途抓取排空后作业进入终态。
    /// 作业不存在时返回false。
    pub fn cancel(&self, id: &Uuid) -> bool {
        match self.jobs.get(id) {
            Some(entry) => {
                entry.state.cancel();
                info!(job_id = %id, "crawl job cancellation requested");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
