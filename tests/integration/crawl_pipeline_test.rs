// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::mount_page;
use linkscout::domain::models::job::{CrawlConfig, JobState};
use linkscout::domain::models::link::Classification;
use linkscout::domain::repositories::link_repository::{LinkFilter, LinkRepository};
use linkscout::domain::services::crawl_service::{CoordinatorSettings, CrawlCoordinator};
use linkscout::domain::services::llm_service::{LinkClassifier, NoopClassifier, OpenAiClassifier};
use linkscout::engines::reqwest_engine::ReqwestEngine;
use linkscout::engines::traits::FetchEngine;
use linkscout::infrastructure::repositories::memory_link_repo::MemoryLinkRepository;
use linkscout::utils::robots::{AllowAllPolicy, CrawlPolicyTrait, RobotsChecker};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline(
    classifier: Arc<dyn LinkClassifier>,
    policy: Arc<dyn CrawlPolicyTrait>,
) -> (CrawlCoordinator<MemoryLinkRepository>, Arc<MemoryLinkRepository>) {
    let repo = Arc::new(MemoryLinkRepository::new());
    let engine: Arc<dyn FetchEngine> =
        Arc::new(ReqwestEngine::new(4, "linkscout-test/0.1").expect("engine"));
    let coordinator = CrawlCoordinator::new(
        engine,
        classifier,
        policy,
        repo.clone(),
        CoordinatorSettings::default(),
    );
    (coordinator, repo)
}

fn config(seed: String) -> CrawlConfig {
    CrawlConfig {
        seed_urls: vec![seed],
        min_score: 0.3,
        ..CrawlConfig::default()
    }
}

#[tokio::test]
async fn test_document_and_contact_links_outrank_generic_pages() {
    let target = MockServer::start().await;
    mount_page(
        &target,
        "/",
        r#"<body>
            <p>City of Example <a href="/files/budget.pdf">FY 2025 Budget</a></p>
            <p><a href="/contact">Contact Us</a></p>
            <p><a href="/about">About our town</a></p>
        </body>"#,
    )
    .await;

    let (coordinator, repo) = pipeline(Arc::new(NoopClassifier), Arc::new(AllowAllPolicy));
    let state = JobState::new();
    let mut cfg = config(target.uri());
    cfg.use_llm = false;

    coordinator.run(&cfg, &state).await.unwrap();

    let links = repo.query(&LinkFilter::default()).await.unwrap();
    assert_eq!(links.len(), 2, "the generic /about page scores below 0.3");
    assert!(links[0].url.ends_with("/files/budget.pdf"));
    assert_eq!(links[0].classification, Classification::Document);
    assert!(links[0].final_score >= links[1].final_score);
    assert_eq!(links[1].classification, Classification::Contact);
    assert!(links[1].matched_keywords.iter().any(|k| k == "Contact"));
}

#[tokio::test]
async fn test_high_scoring_generic_links_are_followed() {
    let target = MockServer::start().await;
    mount_page(
        &target,
        "/",
        r#"<a href="/finance">Annual Budget Finance Report</a>"#,
    )
    .await;
    mount_page(
        &target,
        "/finance",
        r#"<a href="/finance/acfr-2025.pdf">ACFR 2025</a>"#,
    )
    .await;

    let (coordinator, repo) = pipeline(Arc::new(NoopClassifier), Arc::new(AllowAllPolicy));
    let state = JobState::new();
    let mut cfg = config(target.uri());
    cfg.use_llm = false;

    coordinator.run(&cfg, &state).await.unwrap();

    let links = repo.query(&LinkFilter::default()).await.unwrap();
    assert!(links.iter().any(|l| l.url.ends_with("/finance/acfr-2025.pdf")));
    let depths: Vec<u32> = links.iter().map(|l| l.depth).collect();
    assert!(depths.contains(&2), "second-level discovery expected");
    assert_eq!(state.pages_fetched.load(std::sync::atomic::Ordering::Relaxed), 2);
}

#[tokio::test]
async fn test_llm_verdict_refines_borderline_link() {
    let target = MockServer::start().await;
    mount_page(&target, "/", r#"<a href="/news">Budget Finance</a>"#).await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                { "message": { "content": "Link 1: 0.9 - matches budget reporting intent" } }
            ]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    let classifier = Arc::new(OpenAiClassifier::new(
        "test-key".to_string(),
        "test-model".to_string(),
        llm.uri(),
        30,
        600,
        Duration::from_secs(5),
    ));
    let (coordinator, repo) = pipeline(classifier, Arc::new(AllowAllPolicy));
    let state = JobState::new();

    coordinator.run(&config(target.uri()), &state).await.unwrap();

    let links = repo.query(&LinkFilter::default()).await.unwrap();
    let news = links.iter().find(|l| l.url.ends_with("/news")).unwrap();
    assert!((news.rule_score - 0.4).abs() < 1e-9);
    assert_eq!(news.llm_score, Some(0.9));
    assert!((news.final_score - 0.9).abs() < 1e-9);
    assert!(news.llm_reason.as_deref().unwrap().contains("budget"));
}

#[tokio::test]
async fn test_llm_outage_degrades_to_rule_scores() {
    let target = MockServer::start().await;
    mount_page(&target, "/", r#"<a href="/news">Budget Finance</a>"#).await;

    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&llm)
        .await;

    let classifier = Arc::new(OpenAiClassifier::new(
        "test-key".to_string(),
        "test-model".to_string(),
        llm.uri(),
        30,
        600,
        Duration::from_secs(5),
    ));
    let (coordinator, repo) = pipeline(classifier, Arc::new(AllowAllPolicy));
    let state = JobState::new();

    coordinator.run(&config(target.uri()), &state).await.unwrap();

    let links = repo.query(&LinkFilter::default()).await.unwrap();
    assert_eq!(links.len(), 1);
    assert!(links[0].llm_score.is_none());
    assert_eq!(links[0].final_score, links[0].rule_score);
    assert!(state.llm_fallbacks.load(std::sync::atomic::Ordering::Relaxed) >= 1);
}

#[tokio::test]
async fn test_robots_disallow_skips_seed() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&target)
        .await;
    Mock::given(method("GET"))
        .and(path("/private/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<a href=\"/x\">x</a>"))
        .expect(0)
        .mount(&target)
        .await;

    let (coordinator, repo) = pipeline(Arc::new(NoopClassifier), Arc::new(RobotsChecker::new()));
    let state = JobState::new();
    let mut cfg = config(format!("{}/private/report", target.uri()));
    cfg.use_llm = false;

    coordinator.run(&cfg, &state).await.unwrap();

    assert_eq!(state.pages_fetched.load(std::sync::atomic::Ordering::Relaxed), 0);
    assert!(repo.query(&LinkFilter::default()).await.unwrap().is_empty());
}
