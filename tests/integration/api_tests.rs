// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, mount_page, TestApp};
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;
use wiremock::MockServer;

/// 轮询作业直到终态
async fn wait_for_job(app: &TestApp, id: &str) -> Value {
    for _ in 0..200 {
        let response = app.server.get(&format!("/v1/jobs/{id}")).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        let status = body["status"].as_str().unwrap_or_default().to_string();
        if status == "done" || status == "failed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} never reached a terminal state");
}

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");

    let response = app.server.get("/v1/version").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(!response.text().is_empty());
}

#[tokio::test]
async fn test_submit_job_and_query_links() {
    let target = MockServer::start().await;
    mount_page(
        &target,
        "/",
        r#"<body>
            <p><a href="/files/budget.pdf">FY 2025 Budget</a></p>
            <p><a href="/contact">Contact the Finance Director</a></p>
            <p><a href="/gallery">Photo Gallery</a></p>
        </body>"#,
    )
    .await;

    let app = create_test_app().await;
    let response = app
        .server
        .post("/v1/jobs")
        .json(&json!({
            "seed_urls": [target.uri()],
            "max_depth": 1,
            "min_score": 0.3,
            "use_llm": false
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);

    let accepted: Value = response.json();
    let id = accepted["id"].as_str().unwrap().to_string();

    let job = wait_for_job(&app, &id).await;
    assert_eq!(job["status"], "done");
    assert_eq!(job["stats"]["pages_fetched"], 1);

    // Ranked query surface
    let response = app.server.get("/v1/links").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let links: Value = response.json();
    let links = links.as_array().unwrap();
    assert_eq!(links.len(), 2);
    // The contact anchor hits three keywords and outranks the document here
    assert_eq!(links[0]["classification"], "contact");
    assert!(links[1]["url"]
        .as_str()
        .unwrap()
        .ends_with("/files/budget.pdf"));
    assert_eq!(links[1]["classification"], "document");

    let response = app.server.get("/v1/links/count").await;
    let count: Value = response.json();
    assert_eq!(count["count"], 2);

    let response = app.server.get("/v1/domains").await;
    let domains: Value = response.json();
    let per_domain = domains["domains"].as_object().unwrap();
    assert_eq!(per_domain.len(), 1);
    assert_eq!(*per_domain.values().next().unwrap(), 2);
}

#[tokio::test]
async fn test_link_filters() {
    let target = MockServer::start().await;
    mount_page(
        &target,
        "/",
        r#"<p><a href="/files/budget.pdf">Budget</a></p>
           <p><a href="/contact">Contact</a></p>"#,
    )
    .await;

    let app = create_test_app().await;
    let response = app
        .server
        .post("/v1/jobs")
        .json(&json!({
            "seed_urls": [target.uri()],
            "min_score": 0.3,
            "use_llm": false
        }))
        .await;
    let accepted: Value = response.json();
    wait_for_job(&app, accepted["id"].as_str().unwrap()).await;

    let response = app.server.get("/v1/links?classification=document").await;
    let links: Value = response.json();
    assert_eq!(links.as_array().unwrap().len(), 1);

    let response = app.server.get("/v1/links?min_score=0.99").await;
    let links: Value = response.json();
    assert!(links.as_array().unwrap().is_empty());

    // Out-of-range filter values are rejected, not silently ignored
    let response = app.server.get("/v1/links?min_score=1.5").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_job_without_seeds_is_rejected() {
    let app = create_test_app().await;
    let response = app
        .server
        .post("/v1/jobs")
        .json(&json!({ "seed_urls": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_job_returns_not_found() {
    let app = create_test_app().await;
    let id = Uuid::new_v4();

    let response = app.server.get(&format!("/v1/jobs/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app.server.delete(&format!("/v1/jobs/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_running_job() {
    let target = MockServer::start().await;
    mount_page(&target, "/", r#"<a href="/files/budget.pdf">Budget</a>"#).await;

    let app = create_test_app().await;
    let response = app
        .server
        .post("/v1/jobs")
        .json(&json!({ "seed_urls": [target.uri()], "use_llm": false }))
        .await;
    let accepted: Value = response.json();
    let id = accepted["id"].as_str().unwrap().to_string();

    let response = app.server.delete(&format!("/v1/jobs/{id}")).await;
    assert_eq!(response.status_code(), StatusCode::ACCEPTED);

    // Cancellation is cooperative; the job still reaches a terminal state
    let job = wait_for_job(&app, &id).await;
    let status = job["status"].as_str().unwrap();
    assert!(status == "done" || status == "failed");
}

#[tokio::test]
async fn test_failed_seed_reports_failed_job() {
    let app = create_test_app().await;
    let response = app
        .server
        .post("/v1/jobs")
        .json(&json!({
            "seed_urls": ["http://127.0.0.1:9/"],
            "use_llm": false
        }))
        .await;
    let accepted: Value = response.json();

    let job = wait_for_job(&app, accepted["id"].as_str().unwrap()).await;
    assert_eq!(job["status"], "failed");
    assert!(job["error"].as_str().is_some());
}
