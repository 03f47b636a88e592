// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use uuid::Uuid;

/// 默认关键词列表
pub const DEFAULT_KEYWORDS: [&str; 7] = [
    "ACFR", "Budget", "Finance", "Contact", "Director", "Annual", "Report",
];

/// 爬取作业配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// 种子URL列表
    pub seed_urls: Vec<String>,
    /// 优先关键词
    pub keywords: Vec<String>,
    /// 最大爬取深度
    pub max_depth: u32,
    /// 结果入库的最低分数阈值
    pub min_score: f64,
    /// 单页处理的最大链接数
    pub max_links_per_page: usize,
    /// 是否启用语义精排
    pub use_llm: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_urls: Vec::new(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            max_depth: 2,
            min_score: 0.5,
            max_links_per_page: 100,
            use_llm: true,
        }
    }
}

impl CrawlConfig {
    /// 继续下钻所需的分数阈值
    ///
    /// 跟进链接比记录链接要求更高的置信度。
    pub fn follow_threshold(&self) -> f64 {
        (self.min_score + 0.1).max(0.7)
    }
}

/// 分数合并策略
///
/// 语义分数一旦获得即覆盖规则分数是默认策略：语义信号被信任为
/// 更强的判断，而非与启发式取平均。策略保持可配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// 语义分数存在时直接覆盖规则分数
    #[default]
    Override,
    /// 规则分数与语义分数取均值
    Blend,
}

impl MergePolicy {
    /// 从规则分数与可选的语义分数导出最终分数
    pub fn merge(&self, rule_score: f64, llm_score: Option<f64>) -> f64 {
        match (self, llm_score) {
            (_, None) => rule_score,
            (MergePolicy::Override, Some(llm)) => llm,
            (MergePolicy::Blend, Some(llm)) => (rule_score + llm) / 2.0,
        }
    }
}

/// 作业状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → Running → Done/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 等待调度
    #[default]
    Pending,
    /// 运行中（跨越多个深度层）
    Running,
    /// 已完成（允许部分分支失败）
    Done,
    /// 已失败（仅当所有种子任务失败或被取消且无产出）
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "done" => Ok(JobStatus::Done),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 作业统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStats {
    pub pages_fetched: u64,
    pub failed_fetches: u64,
    pub links_found: u64,
    pub links_stored: u64,
    pub llm_refined: u64,
    pub llm_fallbacks: u64,
}

/// 作业运行时共享状态
///
/// 协调器与各工作器并发更新的计数器，以及作业级取消信号。
/// 取消后工作器不再入队新任务，在途抓取排空至完成或超时。
#[derive(Debug, Default)]
pub struct JobState {
    cancelled: AtomicBool,
    pub pages_fetched: AtomicU64,
    pub failed_fetches: AtomicU64,
    pub links_found: AtomicU64,
    pub links_stored: AtomicU64,
    pub llm_refined: AtomicU64,
    pub llm_fallbacks: AtomicU64,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> JobStats {
        JobStats {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            failed_fetches: self.failed_fetches.load(Ordering::Relaxed),
            links_found: self.links_found.load(Ordering::Relaxed),
            links_stored: self.links_stored.load(Ordering::Relaxed),
            llm_refined: self.llm_refined.load(Ordering::Relaxed),
            llm_fallbacks: self.llm_fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// 爬取作业实体
///
/// 提交时创建，由协调器随进度更新，Done/Failed为终态。
/// 状态查询始终携带部分结果的统计，不会以崩溃形式暴露。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlJob {
    pub id: Uuid,
    pub config: CrawlConfig,
    pub status: JobStatus,
    pub stats: JobStats,
    /// 作业级失败原因（仅Failed时存在）
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrawlJob {
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            status: JobStatus::Pending,
            stats: JobStats::default(),
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_roundtrip() {
        for s in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Done,
            JobStatus::Failed,
        ] {
            assert_eq!(s.to_string().parse::<JobStatus>().unwrap(), s);
        }
    }

    #[test]
    fn test_merge_policy_override_trusts_llm_score() {
        let policy = MergePolicy::Override;
        assert_eq!(policy.merge(0.4, Some(0.9)), 0.9);
        assert_eq!(policy.merge(0.4, None), 0.4);
    }

    #[test]
    fn test_merge_policy_blend_averages() {
        let policy = MergePolicy::Blend;
        assert!((policy.merge(0.4, Some(0.8)) - 0.6).abs() < 1e-9);
        assert_eq!(policy.merge(0.4, None), 0.4);
    }

    #[test]
    fn test_follow_threshold_floor() {
        let mut config = CrawlConfig::default();
        assert_eq!(config.follow_threshold(), 0.7);
        config.min_score = 0.8;
        assert!((config.follow_threshold() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_job_state_cancellation() {
        let state = JobState::new();
        assert!(!state.is_cancelled());
        state.cancel();
        assert!(state.is_cancelled());
    }
}
