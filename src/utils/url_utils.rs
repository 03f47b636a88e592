// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::CrawlError;
use dashmap::DashSet;
use url::Url;

/// 规范化URL
///
/// 相对引用会根据`base`解析；scheme与host转为小写，默认端口与
/// fragment被移除，重复的尾部斜杠折叠为一个。规范化是幂等的：
/// `normalize(normalize(u)) == normalize(u)`。
///
/// # 参数
///
/// * `raw` - 原始URL字符串（可能为相对路径）
/// * `base` - 解析相对引用所用的基础URL
///
/// # 返回值
///
/// * `Ok(Url)` - 规范化后的URL
/// * `Err(CrawlError::InvalidUrl)` - URL无法解析或scheme不受支持
pub fn normalize(raw: &str, base: Option<&Url>) -> Result<Url, CrawlError> {
    let mut url = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    }
    .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", raw, e)))?;

    // Only http(s) targets are crawlable
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CrawlError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            url.scheme(),
            raw
        )));
    }

    // Fragments never affect the fetched resource
    url.set_fragment(None);

    // The url crate already lowercases scheme/host and drops known default
    // ports; duplicate trailing slashes still need collapsing by hand.
    if url.path().ends_with("//") {
        let collapsed = format!("{}/", url.path().trim_end_matches('/'));
        url.set_path(&collapsed);
    }

    Ok(url)
}

/// 访问集合
///
/// 单个作业生命周期内已入队或已抓取URL的集合。`mark_visited`
/// 把检查与标记合并为一次原子操作，避免并发工作器重复入队。
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 原子性地检查并标记URL
    ///
    /// # 返回值
    ///
    /// 首次标记返回`true`，已存在返回`false`
    pub fn mark_visited(&self, url: &Url) -> bool {
        self.inner.insert(url.as_str().to_string())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.inner.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
