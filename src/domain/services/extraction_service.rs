// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::link::CandidateLink;
use crate::utils::url_utils;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

// Context longer than this gains nothing for scoring or prompts
const MAX_CONTEXT_LEN: usize = 300;

/// 链接提取器
///
/// 从页面正文解析候选出链，按文档顺序截取前N条。畸形标记
/// 优雅降级：能解析多少锚点就返回多少，绝不让整页失败。
pub struct LinkExtractor;

impl LinkExtractor {
    /// 从HTML正文提取候选链接
    ///
    /// # 参数
    ///
    /// * `body` - 页面HTML正文
    /// * `base_url` - 解析相对引用的基础URL
    /// * `max_links` - 单页链接数上限（按文档顺序取前N条）
    ///
    /// # 返回值
    ///
    /// 候选链接列表，每条携带规范化URL、锚文本与周边上下文
    pub fn extract(body: &str, base_url: &Url, max_links: usize) -> Vec<CandidateLink> {
        let document = Html::parse_document(body);
        let selector = match Selector::parse("a[href]") {
            Ok(s) => s,
            Err(e) => {
                warn!("anchor selector failed to parse: {:?}", e);
                return Vec::new();
            }
        };

        let mut links = Vec::new();
        for element in document.select(&selector) {
            if links.len() >= max_links {
                break;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let href = href.trim();
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("javascript:")
            {
                continue;
            }

            // Normalization rejects unsupported schemes and malformed hrefs;
            // those links are simply dropped.
            let url = match url_utils::normalize(href, Some(base_url)) {
                Ok(url) => url,
                Err(_) => continue,
            };

            let anchor_text = collect_text(&element);
            let context = element
                .parent()
                .and_then(ElementRef::wrap)
                .map(|parent| collect_text(&parent))
                .unwrap_or_default();

            links.push(CandidateLink {
                url,
                anchor_text,
                context: truncate(&context, MAX_CONTEXT_LEN),
            });
        }

        links
    }
}

fn collect_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    text.chars().take(max_len).collect()
}
