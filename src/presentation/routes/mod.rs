// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::link_repository::LinkRepository;
use crate::presentation::handlers::{job_handler, link_handler};
use axum::{
    routing::{delete, get, post},
    Router,
};

/// 创建应用路由
///
/// 处理器对仓库实现保持泛型，Extension层在启动时注入具体实现。
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes<R>() -> Router
where
    R: LinkRepository + 'static,
{
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route("/v1/jobs", post(job_handler::submit_job::<R>))
        .route("/v1/jobs/{id}", get(job_handler::get_job::<R>))
        .route("/v1/jobs/{id}", delete(job_handler::cancel_job::<R>))
        .route("/v1/links", get(link_handler::list_links::<R>))
        .route("/v1/links/count", get(link_handler::count_links::<R>))
        .route("/v1/domains", get(link_handler::count_domains::<R>));

    Router::new().merge(public_routes).merge(api_routes)
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
