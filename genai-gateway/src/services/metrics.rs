//! Prometheus metrics for genai-gateway.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

pub struct GatewayMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    provider_latency: Histogram,
    provider_errors: IntCounterVec,
}

static METRICS: OnceLock<GatewayMetrics> = OnceLock::new();

impl GatewayMetrics {
    fn new() -> Self {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("genai_requests_total", "Total number of generation requests"),
            &["outcome"],
        )
        .expect("metric can be created");

        let provider_latency = Histogram::with_opts(
            HistogramOpts::new(
                "genai_provider_latency_seconds",
                "Upstream provider call latency in seconds",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )
        .expect("metric can be created");

        let provider_errors = IntCounterVec::new(
            Opts::new(
                "genai_provider_errors_total",
                "Total number of failed provider calls",
            ),
            &["kind"],
        )
        .expect("metric can be created");

        registry
            .register(Box::new(requests_total.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(provider_latency.clone()))
            .expect("collector can be registered");
        registry
            .register(Box::new(provider_errors.clone()))
            .expect("collector can be registered");

        Self {
            registry,
            requests_total,
            provider_latency,
            provider_errors,
        }
    }
}

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() -> &'static GatewayMetrics {
    METRICS.get_or_init(GatewayMetrics::new)
}

/// Records one provider call; `error_kind` is `None` on success.
pub fn observe_provider_call(elapsed: Duration, error_kind: Option<&str>) {
    let metrics = init_metrics();
    metrics.provider_latency.observe(elapsed.as_secs_f64());

    let outcome = match error_kind {
        Some(kind) => {
            metrics.provider_errors.with_label_values(&[kind]).inc();
            "error"
        }
        None => "success",
    };
    metrics.requests_total.with_label_values(&[outcome]).inc();
}

/// Counts a request rejected before the provider was called.
pub fn record_invalid_request() {
    init_metrics()
        .requests_total
        .with_label_values(&["invalid"])
        .inc();
}

/// Renders the registry in the Prometheus text format.
pub fn gather() -> Result<String, AppError> {
    let metric_families = init_metrics().registry.gather();
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode metrics: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Metrics are not UTF-8: {}", e)))
}
