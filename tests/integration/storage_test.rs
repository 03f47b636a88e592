// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Utc;
use linkscout::domain::models::link::{Classification, ScoredLink};
use linkscout::domain::repositories::link_repository::{LinkFilter, LinkRepository};
use linkscout::infrastructure::repositories::memory_link_repo::MemoryLinkRepository;
use linkscout::infrastructure::repositories::sqlite_link_repo::SqliteLinkRepository;

fn sample(url: &str, final_score: f64, depth: u32, classification: Classification) -> ScoredLink {
    ScoredLink {
        url: url.to_string(),
        source_url: "https://example.gov/".to_string(),
        anchor_text: "Budget".to_string(),
        depth,
        rule_score: final_score,
        llm_score: None,
        final_score,
        matched_keywords: vec!["Budget".to_string()],
        classification,
        llm_reason: None,
        discovered_at: Utc::now(),
    }
}

/// 两个存储后端共同的契约测试
async fn storage_contract<R: LinkRepository>(repo: &R) {
    repo.upsert(&sample(
        "https://a.example.gov/budget.pdf",
        0.85,
        1,
        Classification::Document,
    ))
    .await
    .unwrap();
    repo.upsert(&sample(
        "https://a.example.gov/contact",
        0.55,
        2,
        Classification::Contact,
    ))
    .await
    .unwrap();
    repo.upsert(&sample(
        "https://b.example.gov/report",
        0.55,
        1,
        Classification::Generic,
    ))
    .await
    .unwrap();

    // Ranked ordering: final score desc, then depth asc, then url
    let links = repo.query(&LinkFilter::default()).await.unwrap();
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].url, "https://a.example.gov/budget.pdf");
    assert_eq!(links[1].url, "https://b.example.gov/report");
    assert_eq!(links[2].url, "https://a.example.gov/contact");

    // Upsert replaces by url instead of duplicating
    let mut updated = sample(
        "https://a.example.gov/contact",
        0.95,
        2,
        Classification::Contact,
    );
    updated.llm_score = Some(0.95);
    updated.llm_reason = Some("contact page for finance staff".to_string());
    repo.upsert(&updated).await.unwrap();

    let links = repo.query(&LinkFilter::default()).await.unwrap();
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].url, "https://a.example.gov/contact");
    assert_eq!(links[0].llm_score, Some(0.95));

    // Filters
    let filter = LinkFilter {
        domain: Some("a.example.gov".to_string()),
        ..LinkFilter::default()
    };
    assert_eq!(repo.query(&filter).await.unwrap().len(), 2);
    assert_eq!(repo.count(&filter).await.unwrap(), 2);

    let filter = LinkFilter {
        min_score: Some(0.8),
        ..LinkFilter::default()
    };
    assert_eq!(repo.count(&filter).await.unwrap(), 2);

    let filter = LinkFilter {
        classification: Some(Classification::Document),
        ..LinkFilter::default()
    };
    let documents = repo.query(&filter).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].classification, Classification::Document);

    // Pagination
    let filter = LinkFilter {
        limit: Some(2),
        ..LinkFilter::default()
    };
    assert_eq!(repo.query(&filter).await.unwrap().len(), 2);
    let filter = LinkFilter {
        limit: Some(2),
        offset: Some(2),
        ..LinkFilter::default()
    };
    assert_eq!(repo.query(&filter).await.unwrap().len(), 1);

    // Per-domain counts
    let domains = repo.count_domains().await.unwrap();
    assert_eq!(domains.get("a.example.gov"), Some(&2));
    assert_eq!(domains.get("b.example.gov"), Some(&1));
}

#[tokio::test]
async fn test_memory_repository_contract() {
    let repo = MemoryLinkRepository::new();
    storage_contract(&repo).await;
}

#[tokio::test]
async fn test_sqlite_repository_contract() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.db");
    let repo = SqliteLinkRepository::connect(path.to_str().unwrap())
        .await
        .unwrap();
    storage_contract(&repo).await;
}

#[tokio::test]
async fn test_sqlite_repository_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("links.db");
    let path = path.to_str().unwrap();

    {
        let repo = SqliteLinkRepository::connect(path).await.unwrap();
        repo.upsert(&sample(
            "https://a.example.gov/budget.pdf",
            0.85,
            1,
            Classification::Document,
        ))
        .await
        .unwrap();
    }

    let repo = SqliteLinkRepository::connect(path).await.unwrap();
    let links = repo.query(&LinkFilter::default()).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].classification, Classification::Document);
    assert!(links[0].matched_keywords.contains(&"Budget".to_string()));
}
