// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化Prometheus指标导出器
///
/// 在配置指定的地址上启动HTTP导出端点，并登记爬取管线的各项
/// 计数器。导出器不可用时仅记录告警，不影响爬取本身。
///
/// # 参数
///
/// * `settings` - 指标导出配置（监听地址与端口）
pub fn init_metrics(settings: &MetricsSettings) {
    let addr: SocketAddr = match format!("{}:{}", settings.host, settings.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics listen address {}:{}: {}", settings.host, settings.port, e);
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_counter!("linkscout_pages_fetched", "成功抓取并提取的页面数");
    describe_counter!("linkscout_fetch_failures", "抓取失败的任务数");
    describe_counter!("linkscout_llm_batches", "发往语义分类服务的批次数");
    describe_counter!(
        "linkscout_llm_batch_failures",
        "失败并回退到规则分数的语义分类批次数"
    );
    describe_counter!("linkscout_links_stored", "落库的评分链接数");

    info!("Metrics exporter listening on {}", addr);
}
