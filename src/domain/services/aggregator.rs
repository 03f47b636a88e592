// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::link::ScoredLink;
use std::collections::HashMap;

/// 结果聚合器
///
/// 在交付存储协作方之前合并最终结果：按规范化URL去重（冲突
/// 保留最高分），按最终分数降序排序，同分先浅深度再URL字典序。
/// 对确定性的输入，输出也是确定性的。
pub struct ResultAggregator;

impl ResultAggregator {
    /// 合并、去重并排序最终评分链接
    pub fn finalize(links: Vec<ScoredLink>) -> Vec<ScoredLink> {
        let mut best: HashMap<String, ScoredLink> = HashMap::new();

        for link in links {
            match best.get(&link.url) {
                Some(existing)
                    if existing.final_score > link.final_score
                        || (existing.final_score == link.final_score
                            && existing.depth <= link.depth) => {}
                _ => {
                    best.insert(link.url.clone(), link);
                }
            }
        }

        let mut merged: Vec<ScoredLink> = best.into_values().collect();
        merged.sort_by(|a, b| {
            b.final_score
                .total_cmp(&a.final_score)
                .then_with(|| a.depth.cmp(&b.depth))
                .then_with(|| a.url.cmp(&b.url))
        });
        merged
    }
}
