//! Timeout and instrumentation wrapper for text generators.
//!
//! Every remote call gets a hard time budget, a `llm.request` span and
//! request/latency metrics. Failures are surfaced immediately; there is no
//! retry.

use super::{GenerationConfig, TextGenerator};
use crate::{Error, Result};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Generator wrapper that bounds each call with a timeout.
pub struct ResilientGenerator<G: TextGenerator> {
    inner: G,
    timeout: Duration,
}

impl<G: TextGenerator> ResilientGenerator<G> {
    /// Wraps a generator with the given per-call timeout.
    #[must_use]
    pub const fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    fn record(provider: &'static str, operation: &'static str, status: &'static str, elapsed: Duration) {
        metrics::counter!(
            "llm_requests_total",
            "provider" => provider,
            "operation" => operation,
            "status" => status
        )
        .increment(1);
        #[allow(clippy::cast_precision_loss)]
        metrics::histogram!(
            "llm_request_duration_ms",
            "provider" => provider,
            "operation" => operation
        )
        .record(elapsed.as_millis() as f64);
    }
}

impl<G: TextGenerator> TextGenerator for ResilientGenerator<G> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let provider = self.inner.name();
        let operation = config.operation_label();
        let span = tracing::info_span!(
            "llm.request",
            provider = provider,
            operation = operation,
            status = tracing::field::Empty
        );

        async {
            let start = Instant::now();
            let outcome = tokio::time::timeout(self.timeout, self.inner.generate(prompt, config)).await;
            let elapsed = start.elapsed();

            let (status, result) = match outcome {
                Ok(Ok(text)) => ("success", Ok(text)),
                Ok(Err(err)) => ("error", Err(err)),
                Err(_) => {
                    let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                    tracing::warn!(provider, operation, timeout_ms, "LLM request timed out");
                    (
                        "timeout",
                        Err(Error::Timeout {
                            operation: format!("{provider}_{operation}"),
                            timeout_ms,
                        }),
                    )
                },
            };

            tracing::Span::current().record("status", status);
            Self::record(provider, operation, status, elapsed);
            result
        }
        .instrument(span)
        .await
    }
}
