// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::link::Classification;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// Signal weights. Tunable constants, not structural requirements.
const KEYWORD_TEXT_WEIGHT: f64 = 0.20;
const KEYWORD_URL_WEIGHT: f64 = 0.15;
const DOCUMENT_WEIGHT: f64 = 0.25;
const CONTACT_WEIGHT: f64 = 0.20;

// Diminishing returns: keyword hits beyond this stop contributing
const MAX_KEYWORD_HITS: usize = 3;

static DOCUMENT_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(pdf|docx?|xlsx?|csv)$").expect("valid extension pattern"));

// `/about` carries no reliable contact signal on government sites and is
// deliberately not listed here.
const CONTACT_PATH_INDICATORS: [&str; 3] = ["/contact", "/staff", "/directory"];

/// 规则打分结果
#[derive(Debug, Clone)]
pub struct RuleScore {
    /// 规则分数，已夹取到[0,1]
    pub score: f64,
    /// 命中的关键词（原始大小写）
    pub matched_keywords: Vec<String>,
    /// 链接分类
    pub classification: Classification,
}

/// 规则打分器
///
/// 纯函数、无I/O的确定性打分：相同输入永远产生相同输出。
/// 这是可测试性的前提，也是语义精排边界带判定的前提。
pub struct RelevanceScorer {
    /// (小写关键词, 原始关键词)
    keywords: Vec<(String, String)>,
}

impl RelevanceScorer {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .filter(|k| !k.trim().is_empty())
                .map(|k| (k.to_lowercase(), k.clone()))
                .collect(),
        }
    }

    /// 为单个候选链接打分
    ///
    /// 信号构成：锚文本/上下文中的关键词、URL中的关键词、
    /// 文档扩展名、联系页路径指示词。加权求和后夹取到[0,1]。
    pub fn score(&self, url: &Url, anchor_text: &str, context: &str) -> RuleScore {
        let text = format!("{} {}", anchor_text, context).to_lowercase();
        let url_lower = url.as_str().to_lowercase();
        let path_lower = url.path().to_lowercase();

        let mut score = 0.0;
        let mut matched_keywords = Vec::new();
        let mut text_hits = 0usize;
        let mut url_hits = 0usize;

        for (keyword_lower, keyword) in &self.keywords {
            let in_text = text.contains(keyword_lower.as_str());
            let in_url = url_lower.contains(keyword_lower.as_str());

            if in_text && text_hits < MAX_KEYWORD_HITS {
                score += KEYWORD_TEXT_WEIGHT;
                text_hits += 1;
            }
            if in_url && url_hits < MAX_KEYWORD_HITS {
                score += KEYWORD_URL_WEIGHT;
                url_hits += 1;
            }
            if in_text || in_url {
                matched_keywords.push(keyword.clone());
            }
        }

        let is_document = DOCUMENT_EXTENSION.is_match(&path_lower);
        if is_document {
            score += DOCUMENT_WEIGHT;
        }

        let is_contact = CONTACT_PATH_INDICATORS
            .iter()
            .any(|p| path_lower.contains(p))
            || text.contains("contact");
        if is_contact {
            score += CONTACT_WEIGHT;
        }

        let classification = if is_document {
            Classification::Document
        } else if is_contact {
            Classification::Contact
        } else if !matched_keywords.is_empty() {
            Classification::Generic
        } else {
            Classification::Unknown
        };

        RuleScore {
            score: score.clamp(0.0, 1.0),
            matched_keywords,
            classification,
        }
    }
}
