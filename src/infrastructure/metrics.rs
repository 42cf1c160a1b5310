// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 启动 Prometheus 指标导出器
///
/// 未启用时直接返回；端口被占用等安装失败只记录警告，不影响抓取流程
///
/// # 返回值
///
/// * `Ok(())` - 导出器已启动或已禁用
/// * `Err(AddrParseError)` - 监听地址无法解析
pub fn init_metrics(settings: &MetricsSettings) -> Result<(), std::net::AddrParseError> {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return Ok(());
    }

    let addr: SocketAddr = settings.listen_addr.parse()?;

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return Ok(());
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

fn describe_metrics() {
    metrics::describe_counter!("crawl_cycles_total", "Crawl cycles by outcome");
    metrics::describe_counter!("events_saved_total", "Events upserted successfully");
    metrics::describe_counter!("events_failed_total", "Event upserts that failed");
    metrics::describe_counter!("rule_cache_hits_total", "Rule lookups served from memory");
    metrics::describe_counter!("rule_generations_total", "Rule generations by outcome");
    metrics::describe_counter!("mined_candidates_total", "Event-shaped objects mined from JSON");
    metrics::describe_histogram!(
        "crawl_cycle_duration_seconds",
        metrics::Unit::Seconds,
        "Wall time of non-idle crawl cycles"
    );
}
