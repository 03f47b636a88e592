// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// 链接分类枚举
///
/// 由规则打分器依据URL与上下文信号判定；Document与Contact是
/// 终端链接，被记录但不再继续遍历。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// 文档链接（pdf/doc/xls/csv等）
    Document,
    /// 联系页链接
    Contact,
    /// 匹配到关键词但无结构信号
    Generic,
    /// 无任何信号
    Unknown,
}

impl Classification {
    /// 该分类是否值得继续遍历
    ///
    /// 文档与联系页是终端目标，跟进它们不会带来新的链接结构。
    pub fn is_traversable(&self) -> bool {
        matches!(self, Classification::Generic | Classification::Unknown)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Classification::Document => write!(f, "document"),
            Classification::Contact => write!(f, "contact"),
            Classification::Generic => write!(f, "generic"),
            Classification::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for Classification {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(Classification::Document),
            "contact" => Ok(Classification::Contact),
            "generic" => Ok(Classification::Generic),
            "unknown" => Ok(Classification::Unknown),
            _ => Err(()),
        }
    }
}

/// 候选链接
///
/// 提取器从页面产出的候选出链，携带锚文本与周边上下文。
#[derive(Debug, Clone)]
pub struct CandidateLink {
    /// 规范化后的绝对URL
    pub url: Url,
    /// 锚文本
    pub anchor_text: String,
    /// 周边上下文（父元素文本）
    pub context: String,
}

/// 页面上下文
///
/// 单次成功抓取的产物，归产出它的工作器所有，打分后即丢弃。
#[derive(Debug)]
pub struct PageContext {
    pub url: Url,
    pub fetched_at: DateTime<Utc>,
    pub status_code: u16,
    pub raw_links: Vec<CandidateLink>,
}

/// 评分链接
///
/// 打分阶段的产物；`final_score`一经设定不再变更，是交给
/// 聚合器并最终落库的单元。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredLink {
    /// 规范化URL
    pub url: String,
    /// 发现该链接的来源页面URL
    pub source_url: String,
    /// 锚文本
    pub anchor_text: String,
    /// 链接所处深度（来源页面深度+1）
    pub depth: u32,
    /// 规则分数
    pub rule_score: f64,
    /// 语义分类分数（未精排时缺省）
    pub llm_score: Option<f64>,
    /// 最终分数，由合并策略从规则分数与语义分数确定性导出
    pub final_score: f64,
    /// 命中的关键词
    pub matched_keywords: Vec<String>,
    /// 链接分类
    pub classification: Classification,
    /// 语义分类给出的理由（若有）
    pub llm_reason: Option<String>,
    /// 发现时间
    pub discovered_at: DateTime<Utc>,
}

impl ScoredLink {
    /// 链接所属域名
    pub fn domain(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_default()
    }
}

/// 爬取任务
///
/// 由协调器在链接通过入队过滤时创建，被某个抓取工作器恰好
/// 消费一次，创建后不可变。
#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
    pub parent_url: Option<Url>,
}
