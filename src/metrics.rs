//! Prometheus metrics for the scam-radar server.
//!
//! Counters and histograms for analyses, rejected inputs and cache
//! performance. Without an installed recorder every call is a no-op.

use metrics::{counter, histogram};

/// Record a completed analysis.
pub fn record_analysis(label: &str, risk_level: &str, duration_ms: u64) {
    counter!("analyses_total", "label" => label.to_string(), "risk_level" => risk_level.to_string())
        .increment(1);
    histogram!("analysis_duration_ms").record(duration_ms as f64);
}

/// Record a rejected input.
pub fn record_rejection(reason: &str) {
    counter!("analysis_rejections_total", "reason" => reason.to_string()).increment(1);
}

/// Record a cache hit.
pub fn record_cache_hit() {
    counter!("cache_hits_total").increment(1);
}

/// Record a cache miss.
pub fn record_cache_miss() {
    counter!("cache_misses_total").increment(1);
}

/// Install the Prometheus metrics exporter and return the recorder handle.
pub fn install_prometheus_recorder(
) -> eyre::Result<metrics_exporter_prometheus::PrometheusHandle> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| eyre::eyre!("failed to install Prometheus recorder: {e}"))
}
