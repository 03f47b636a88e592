// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::CrawlConfig;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 爬取作业请求数据传输对象
///
/// 用于封装客户端提交的爬取作业的相关参数，
/// 未给出的字段回落到领域层默认值
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct JobRequestDto {
    /// 种子URL列表
    #[validate(length(min = 1, message = "at least one seed url is required"))]
    pub seed_urls: Vec<String>,
    /// 优先关键词（缺省使用内置列表）
    pub keywords: Option<Vec<String>>,
    /// 最大爬取深度
    #[validate(range(min = 0, max = 5))]
    pub max_depth: Option<u32>,
    /// 结果入库的最低分数阈值
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_score: Option<f64>,
    /// 单页处理的最大链接数
    #[validate(range(min = 1, max = 500))]
    pub max_links_per_page: Option<usize>,
    /// 是否启用语义精排
    pub use_llm: Option<bool>,
}

impl JobRequestDto {
    /// 转换为领域层作业配置
    pub fn into_config(self) -> CrawlConfig {
        let defaults = CrawlConfig::default();
        CrawlConfig {
            seed_urls: self.seed_urls,
            keywords: self.keywords.unwrap_or(defaults.keywords),
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            min_score: self.min_score.unwrap_or(defaults.min_score),
            max_links_per_page: self
                .max_links_per_page
                .unwrap_or(defaults.max_links_per_page),
            use_llm: self.use_llm.unwrap_or(defaults.use_llm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::job::DEFAULT_KEYWORDS;

    #[test]
    fn test_empty_seed_list_is_rejected() {
        let dto = JobRequestDto {
            seed_urls: vec![],
            keywords: None,
            max_depth: None,
            min_score: None,
            max_links_per_page: None,
            use_llm: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_out_of_range_depth_is_rejected() {
        let dto = JobRequestDto {
            seed_urls: vec!["https://example.gov".to_string()],
            keywords: None,
            max_depth: Some(9),
            min_score: None,
            max_links_per_page: None,
            use_llm: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let dto = JobRequestDto {
            seed_urls: vec!["https://example.gov".to_string()],
            keywords: None,
            max_depth: None,
            min_score: None,
            max_links_per_page: None,
            use_llm: None,
        };
        assert!(dto.validate().is_ok());

        let config = dto.into_config();
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.min_score, 0.5);
        assert_eq!(config.keywords.len(), DEFAULT_KEYWORDS.len());
        assert!(config.use_llm);
    }
}
