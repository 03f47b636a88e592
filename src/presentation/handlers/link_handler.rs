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

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    domain::models::link::ScoredLink,
    domain::repositories::link_repository::{LinkFilter, LinkRepository, RepositoryError},
    presentation::errors::AppError,
};

fn check_filter(filter: &LinkFilter) -> Result<(), RepositoryError> {
    if let Some(min_score) = filter.min_score {
        if !(0.0..=1.0).contains(&min_score) {
            return Err(RepositoryError::InvalidParameter(format!(
                "min_score must be within [0, 1], got {min_score}"
            )));
        }
    }
    Ok(())
}

/// 查询已入库的链接
///
/// 结果按最终分数降序、深度升序、URL字典序返回。
pub async fn list_links<R>(
    Extension(repo): Extension<Arc<R>>,
    Query(filter): Query<LinkFilter>,
) -> Result<Json<Vec<ScoredLink>>, AppError>
where
    R: LinkRepository + 'static,
{
    check_filter(&filter)?;
    let links = repo.query(&filter).await?;
    Ok(Json(links))
}

/// 统计满足过滤条件的链接数
pub async fn count_links<R>(
    Extension(repo): Extension<Arc<R>>,
    Query(filter): Query<LinkFilter>,
) -> Result<Json<Value>, AppError>
where
    R: LinkRepository + 'static,
{
    check_filter(&filter)?;
    let count = repo.count(&filter).await?;
    Ok(Json(json!({ "count": count })))
}

/// 统计每个域名下的链接数
pub async fn count_domains<R>(
    Extension(repo): Extension<Arc<R>>,
) -> Result<Json<Value>, AppError>
where
    R: LinkRepository + 'static,
{
    let domains = repo.count_domains().await?;
    Ok(Json(json!({ "domains": domains })))
}
