// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 爬取错误类型
///
/// 抓取与分类失败都按任务边界吸收并记入日志，只有种子全部失败
/// 才会升级为作业级别的失败。
#[derive(Error, Debug)]
pub enum CrawlError {
    /// URL格式无效，对应链接被丢弃，作业继续
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// 所有种子任务均失败
    #[error("all seed tasks failed")]
    JobFailure,

    /// 作业在产出任何结果前被取消
    #[error("job cancelled before any seed completed")]
    Cancelled,
}
