// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::link::{Classification, ScoredLink};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(String),

    #[error("not found")]
    NotFound,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// 链接查询过滤器
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkFilter {
    /// 按域名过滤
    pub domain: Option<String>,
    /// 最低最终分数
    pub min_score: Option<f64>,
    /// 按分类过滤
    pub classification: Option<Classification>,
    /// 返回条数上限
    pub limit: Option<usize>,
    /// 偏移量
    pub offset: Option<usize>,
}

/// 链接仓库接口
///
/// 核心只依赖这个窄契约；背后可以是文档库，也可以是内存映射，
/// 二者在启动时二选一，核心逻辑不感知差异。查询结果按
/// 最终分数降序、深度升序、URL字典序返回，保证确定性。
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// 按规范化URL插入或覆盖链接
    async fn upsert(&self, link: &ScoredLink) -> Result<(), RepositoryError>;

    /// 查询链接
    async fn query(&self, filter: &LinkFilter) -> Result<Vec<ScoredLink>, RepositoryError>;

    /// 统计满足过滤条件的链接数
    async fn count(&self, filter: &LinkFilter) -> Result<u64, RepositoryError>;

    /// 统计每个域名下的链接数
    async fn count_domains(&self) -> Result<HashMap<String, u64>, RepositoryError>;
}
