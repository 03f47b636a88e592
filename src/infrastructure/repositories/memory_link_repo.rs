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

use crate::domain::models::link::ScoredLink;
use crate::domain::repositories::link_repository::{LinkFilter, LinkRepository, RepositoryError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;

/// 内存链接仓库实现
///
/// 以规范化URL为键的并发映射。数据库不可用或测试场景下的
/// 退路实现，进程退出后数据丢失。
#[derive(Debug, Default)]
pub struct MemoryLinkRepository {
    links: DashMap<String, ScoredLink>,
}

impl MemoryLinkRepository {
    /// 创建新的内存链接仓库实例
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(link: &ScoredLink, filter: &LinkFilter) -> bool {
        if let Some(domain) = &filter.domain {
            if &link.domain() != domain {
                return false;
            }
        }
        if let Some(min_score) = filter.min_score {
            if link.final_score < min_score {
                return false;
            }
        }
        if let Some(classification) = filter.classification {
            if link.classification != classification {
                return false;
            }
        }
        true
    }

    fn collect_sorted(&self, filter: &LinkFilter) -> Vec<ScoredLink> {
        let mut links: Vec<ScoredLink> = self
            .links
            .iter()
            .filter(|entry| Self::matches(entry.value(), filter))
            .map(|entry| entry.value().clone())
            .collect();
        links.sort_by(|a, b| {
            b.final_score
                .total_cmp(&a.final_score)
                .then(a.depth.cmp(&b.depth))
                .then(a.url.cmp(&b.url))
        });
        links
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn upsert(&self, link: &ScoredLink) -> Result<(), RepositoryError> {
        self.links.insert(link.url.clone(), link.clone());
        Ok(())
    }

    async fn query(&self, filter: &LinkFilter) -> Result<Vec<ScoredLink>, RepositoryError> {
        let links = self.collect_sorted(filter);
        let offset = filter.offset.unwrap_or(0);
        let limit = filter.limit.unwrap_or(100);
        Ok(links.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &LinkFilter) -> Result<u64, RepositoryError> {
        Ok(self
            .links
            .iter()
            .filter(|entry| Self::matches(entry.value(), filter))
            .count() as u64)
    }

    async fn count_domains(&self) -> Result<HashMap<String, u64>, RepositoryError> {
        let mut domains: HashMap<String, u64> = HashMap::new();
        for entry in self.links.iter() {
            *domains.entry(entry.value().domain()).or_insert(0) += 1;
        }
        Ok(domains)
    }
}
