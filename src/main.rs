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

use axum::Extension;
use linkscout::config::settings::Settings;
use linkscout::domain::repositories::link_repository::LinkRepository;
use linkscout::domain::services::crawl_service::CrawlCoordinator;
use linkscout::domain::services::llm_service::{LinkClassifier, NoopClassifier, OpenAiClassifier};
use linkscout::engines::reqwest_engine::ReqwestEngine;
use linkscout::engines::traits::FetchEngine;
use linkscout::infrastructure::repositories::memory_link_repo::MemoryLinkRepository;
use linkscout::infrastructure::repositories::sqlite_link_repo::SqliteLinkRepository;
use linkscout::presentation::routes;
use linkscout::utils::robots::{AllowAllPolicy, CrawlPolicyTrait, RobotsChecker};
use linkscout::utils::telemetry;
use linkscout::workers::JobManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting linkscout...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    linkscout::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Select storage backend; the rest of the stack is generic over it
    match settings.storage.backend.as_str() {
        "sqlite" => {
            let path = settings
                .storage
                .sqlite_path
                .clone()
                .unwrap_or_else(|| "./linkscout.db".to_string());
            let repo = Arc::new(SqliteLinkRepository::connect(&path).await?);
            info!("SQLite storage ready at {}", path);
            serve(repo, settings).await
        }
        _ => {
            let repo = Arc::new(MemoryLinkRepository::new());
            info!("In-memory storage ready; results are lost on shutdown");
            serve(repo, settings).await
        }
    }
}

/// 组装组件并启动HTTP服务
async fn serve<R>(repo: Arc<R>, settings: Arc<Settings>) -> anyhow::Result<()>
where
    R: LinkRepository + 'static,
{
    // Fetch engine with per-domain concurrency caps
    let engine: Arc<dyn FetchEngine> = Arc::new(ReqwestEngine::new(
        settings.crawl.per_domain_limit,
        &settings.crawl.user_agent,
    )?);

    // Semantic re-ranking is disabled outright when no API key is configured
    let classifier: Arc<dyn LinkClassifier> = match &settings.llm.api_key {
        Some(api_key) => Arc::new(OpenAiClassifier::new(
            api_key.clone(),
            settings.llm.model.clone(),
            settings.llm.api_base_url.clone(),
            settings.llm.batch_size,
            settings.llm.requests_per_minute,
            Duration::from_secs(settings.llm.timeout_secs),
        )),
        None => {
            info!("No LLM API key configured; rule scores stand as final");
            Arc::new(NoopClassifier)
        }
    };

    let policy: Arc<dyn CrawlPolicyTrait> = if settings.crawl.respect_robots {
        Arc::new(RobotsChecker::new())
    } else {
        Arc::new(AllowAllPolicy)
    };

    let coordinator = Arc::new(CrawlCoordinator::new(
        engine,
        classifier,
        policy,
        repo.clone(),
        settings.coordinator_settings(),
    ));
    let manager = Arc::new(JobManager::new(coordinator));

    let app = routes::routes::<R>()
        .layer(Extension(manager))
        .layer(Extension(repo))
        .layer(Extension(settings.clone()))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
