use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};

use crate::error::InferenceError;

lazy_static! {
    // Backend round-trips
    pub static ref INFERENCE_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "inference_requests_total",
        "Total number of generation requests sent to the backend",
        &["operation", "outcome"]
    )
    .unwrap();

    pub static ref INFERENCE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "inference_duration_seconds",
        "Generation request duration in seconds",
        &["operation"],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0]
    )
    .unwrap();

    pub static ref OFFLINE_FALLBACKS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "offline_fallbacks_total",
        "Total number of responses served from the offline content bank",
        &["operation"]
    )
    .unwrap();

    pub static ref VALIDATION_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "validation_failures_total",
        "Total number of generated problems rejected by validation",
        &["kind"]
    )
    .unwrap();

    // Connection health
    pub static ref BACKEND_HEALTHY: IntGauge = register_int_gauge!(
        "backend_healthy",
        "Whether the generation backend is currently considered healthy"
    )
    .unwrap();

    pub static ref BACKEND_CONSECUTIVE_FAILURES: IntGauge = register_int_gauge!(
        "backend_consecutive_failures",
        "Consecutive failed backend attempts since the last success"
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: track a backend round-trip with metrics
pub async fn track_inference<F, T>(operation: &str, future: F) -> Result<T, InferenceError>
where
    F: std::future::Future<Output = Result<T, InferenceError>>,
{
    let start = std::time::Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    };

    INFERENCE_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();

    INFERENCE_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration);

    result
}

pub fn record_offline_fallback(operation: &str) {
    OFFLINE_FALLBACKS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn record_validation_failure(kind: &str) {
    VALIDATION_FAILURES_TOTAL.with_label_values(&[kind]).inc();
}
