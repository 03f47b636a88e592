// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Extension;
use axum_test::TestServer;
use linkscout::domain::services::crawl_service::{CoordinatorSettings, CrawlCoordinator};
use linkscout::domain::services::llm_service::{LinkClassifier, NoopClassifier};
use linkscout::engines::reqwest_engine::ReqwestEngine;
use linkscout::engines::traits::FetchEngine;
use linkscout::infrastructure::repositories::memory_link_repo::MemoryLinkRepository;
use linkscout::presentation::routes;
use linkscout::utils::robots::AllowAllPolicy;
use linkscout::workers::JobManager;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 测试应用
///
/// 内存存储加真实HTTP引擎，抓取目标由wiremock提供。
pub struct TestApp {
    pub server: TestServer,
    pub repo: Arc<MemoryLinkRepository>,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_classifier(Arc::new(NoopClassifier)).await
}

pub async fn create_test_app_with_classifier(classifier: Arc<dyn LinkClassifier>) -> TestApp {
    let repo = Arc::new(MemoryLinkRepository::new());
    let engine: Arc<dyn FetchEngine> =
        Arc::new(ReqwestEngine::new(4, "linkscout-test/0.1").expect("engine"));
    let coordinator = Arc::new(CrawlCoordinator::new(
        engine,
        classifier,
        Arc::new(AllowAllPolicy),
        repo.clone(),
        CoordinatorSettings::default(),
    ));
    let manager = Arc::new(JobManager::new(coordinator));

    let app = routes::routes::<MemoryLinkRepository>()
        .layer(Extension(manager))
        .layer(Extension(repo.clone()));

    TestApp {
        server: TestServer::new(app).expect("test server"),
        repo,
    }
}

/// 在mock服务器上挂载一个HTML页面
pub async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}
