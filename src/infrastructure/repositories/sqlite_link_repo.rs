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

use crate::domain::models::link::{Classification, ScoredLink};
use crate::domain::repositories::link_repository::{LinkFilter, LinkRepository, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::str::FromStr;

/// SQLite链接仓库实现
///
/// 以规范化URL为主键，命中关键词以JSON文本存储，
/// 时间戳以RFC 3339文本存储。
#[derive(Clone)]
pub struct SqliteLinkRepository {
    pool: SqlitePool,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

impl SqliteLinkRepository {
    /// 连接数据库并准备表结构
    ///
    /// # 参数
    ///
    /// * `path` - SQLite数据库文件路径，不存在时自动创建
    ///
    /// # 返回值
    ///
    /// * `Ok(SqliteLinkRepository)` - 可用的仓库实例
    /// * `Err(RepositoryError)` - 连接或建表失败
    pub async fn connect(path: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| RepositoryError::InvalidParameter(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                url TEXT PRIMARY KEY,
                source_url TEXT NOT NULL,
                anchor_text TEXT NOT NULL,
                domain TEXT NOT NULL,
                depth INTEGER NOT NULL,
                rule_score REAL NOT NULL,
                llm_score REAL,
                final_score REAL NOT NULL,
                matched_keywords TEXT NOT NULL,
                classification TEXT NOT NULL,
                llm_reason TEXT,
                discovered_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_final_score ON links (final_score)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_domain ON links (domain)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_link(row: &sqlx::sqlite::SqliteRow) -> Result<ScoredLink, RepositoryError> {
        let matched_raw: String = row.get("matched_keywords");
        let matched_keywords: Vec<String> = serde_json::from_str(&matched_raw)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        let classification_raw: String = row.get("classification");
        let classification = Classification::from_str(&classification_raw)
            .map_err(|_| RepositoryError::Database(format!(
                "unknown classification: {classification_raw}"
            )))?;
        let discovered_raw: String = row.get("discovered_at");
        let discovered_at = DateTime::parse_from_rfc3339(&discovered_raw)
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .with_timezone(&Utc);

        Ok(ScoredLink {
            url: row.get("url"),
            source_url: row.get("source_url"),
            anchor_text: row.get("anchor_text"),
            depth: row.get::<i64, _>("depth") as u32,
            rule_score: row.get("rule_score"),
            llm_score: row.get("llm_score"),
            final_score: row.get("final_score"),
            matched_keywords,
            classification,
            llm_reason: row.get("llm_reason"),
            discovered_at,
        })
    }

    /// 把过滤器展开为WHERE子句与绑定值
    fn filter_clause(filter: &LinkFilter) -> (String, Vec<String>, Option<f64>) {
        let mut conditions = Vec::new();
        let mut text_binds = Vec::new();
        if let Some(domain) = &filter.domain {
            conditions.push("domain = ?".to_string());
            text_binds.push(domain.clone());
        }
        let mut score_bind = None;
        if let Some(min_score) = filter.min_score {
            conditions.push("final_score >= ?".to_string());
            score_bind = Some(min_score);
        }
        if let Some(classification) = filter.classification {
            conditions.push("classification = ?".to_string());
            text_binds.push(classification.to_string());
        }
        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        (clause, text_binds, score_bind)
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    async fn upsert(&self, link: &ScoredLink) -> Result<(), RepositoryError> {
        let matched = serde_json::to_string(&link.matched_keywords)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO links (
                url, source_url, anchor_text, domain, depth, rule_score,
                llm_score, final_score, matched_keywords, classification,
                llm_reason, discovered_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                source_url = excluded.source_url,
                anchor_text = excluded.anchor_text,
                domain = excluded.domain,
                depth = excluded.depth,
                rule_score = excluded.rule_score,
                llm_score = excluded.llm_score,
                final_score = excluded.final_score,
                matched_keywords = excluded.matched_keywords,
                classification = excluded.classification,
                llm_reason = excluded.llm_reason,
                discovered_at = excluded.discovered_at
            "#,
        )
        .bind(&link.url)
        .bind(&link.source_url)
        .bind(&link.anchor_text)
        .bind(link.domain())
        .bind(link.depth as i64)
        .bind(link.rule_score)
        .bind(link.llm_score)
        .bind(link.final_score)
        .bind(matched)
        .bind(link.classification.to_string())
        .bind(&link.llm_reason)
        .bind(link.discovered_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn query(&self, filter: &LinkFilter) -> Result<Vec<ScoredLink>, RepositoryError> {
        let (clause, text_binds, score_bind) = Self::filter_clause(filter);
        let sql = format!(
            "SELECT * FROM links{clause} \
             ORDER BY final_score DESC, depth ASC, url ASC LIMIT ? OFFSET ?"
        );

        // Bind order mirrors filter_clause: domain, min_score, classification
        let mut query = sqlx::query(&sql);
        let mut texts = text_binds.into_iter();
        if filter.domain.is_some() {
            query = query.bind(texts.next().unwrap_or_default());
        }
        if let Some(min_score) = score_bind {
            query = query.bind(min_score);
        }
        if filter.classification.is_some() {
            query = query.bind(texts.next().unwrap_or_default());
        }
        query = query
            .bind(filter.limit.unwrap_or(100) as i64)
            .bind(filter.offset.unwrap_or(0) as i64);

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_link).collect()
    }

    async fn count(&self, filter: &LinkFilter) -> Result<u64, RepositoryError> {
        let (clause, text_binds, score_bind) = Self::filter_clause(filter);
        let sql = format!("SELECT COUNT(*) AS total FROM links{clause}");

        let mut query = sqlx::query(&sql);
        let mut texts = text_binds.into_iter();
        if filter.domain.is_some() {
            query = query.bind(texts.next().unwrap_or_default());
        }
        if let Some(min_score) = score_bind {
            query = query.bind(min_score);
        }
        if filter.classification.is_some() {
            query = query.bind(texts.next().unwrap_or_default());
        }

        let row = query.fetch_one(&self.pool).await?;
        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn count_domains(&self) -> Result<HashMap<String, u64>, RepositoryError> {
        let rows = sqlx::query("SELECT domain, COUNT(*) AS total FROM links GROUP BY domain")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| (row.get("domain"), row.get::<i64, _>("total") as u64))
            .collect())
    }
}
