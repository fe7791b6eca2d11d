//! Prometheus metrics.

use crate::config::MetricsSettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Installs the global Prometheus recorder.
///
/// Returns `None` when metrics are disabled; `metrics` macros are then no-ops.
/// The handle renders the exposition text served at `/metrics`.
///
/// # Errors
///
/// Returns an error if a global recorder is already installed.
pub fn install_prometheus(settings: MetricsSettings) -> Result<Option<PrometheusHandle>> {
    if !settings.enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::OperationFailed {
            operation: "metrics_recorder_install".to_string(),
            cause: e.to_string(),
        })?;
    describe();

    Ok(Some(handle))
}

fn describe() {
    metrics::describe_counter!(
        "chat_requests_total",
        "Chat requests answered, by intent and response type"
    );
    metrics::describe_counter!(
        "chat_request_failures_total",
        "Chat requests that failed, by reason"
    );
    metrics::describe_counter!(
        "llm_requests_total",
        "Model calls, by provider, operation and status"
    );
    metrics::describe_histogram!(
        "llm_request_duration_ms",
        metrics::Unit::Milliseconds,
        "Model call latency"
    );
    metrics::describe_counter!(
        "visualization_discarded_total",
        "Visualization payloads dropped, by reason"
    );
}
