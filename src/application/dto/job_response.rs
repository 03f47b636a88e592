// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{CrawlJob, JobStats, JobStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 爬取作业状态响应数据传输对象
#[derive(Debug, Serialize, Deserialize)]
pub struct JobResponseDto {
    /// 作业ID
    pub id: Uuid,
    /// 作业状态
    pub status: JobStatus,
    /// 运行统计
    pub stats: JobStats,
    /// 失败原因（仅失败时存在）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 开始时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// 结束时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobResponseDto {
    /// 由作业快照与实时计数器构造响应
    pub fn from_job(job: &CrawlJob, live_stats: JobStats) -> Self {
        Self {
            id: job.id,
            status: job.status,
            stats: live_stats,
            error: job.error.clone(),
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
        }
    }
}

/// 作业提交应答
#[derive(Debug, Serialize, Deserialize)]
pub struct JobAcceptedDto {
    /// 新作业ID
    pub id: Uuid,
    /// 初始状态
    pub status: JobStatus,
}
