//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("play_submissions_total", "Total number of recorded quiz plays");
    metrics::describe_counter!("badge_grants_total", "Total number of badge grant attempts");
    metrics::describe_counter!(
        "badge_rule_failures_total",
        "Badge rules that could not be evaluated or granted"
    );
    metrics::describe_histogram!(
        "badge_evaluation_duration_seconds",
        "Badge evaluation pass duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录一局游戏的提交
#[inline]
pub fn record_play_submission(status: &str) {
    metrics::counter!("play_submissions_total", "status" => status.to_string()).increment(1);
}

/// 记录徽章发放结果（granted / already_held / not_configured）
#[inline]
pub fn record_badge_grant(badge_code: &str, status: &str) {
    metrics::counter!(
        "badge_grants_total",
        "badge_code" => badge_code.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录单条规则失败
#[inline]
pub fn record_rule_failure(badge_code: &str) {
    metrics::counter!(
        "badge_rule_failures_total",
        "badge_code" => badge_code.to_string()
    )
    .increment(1);
}

/// 记录一次完整评估耗时
#[inline]
pub fn record_badge_evaluation(granted: usize, duration_secs: f64) {
    metrics::histogram!(
        "badge_evaluation_duration_seconds",
        "granted" => (granted > 0).to_string()
    )
    .record(duration_secs);
}
