//! Visualization payload generation.
//!
//! Every failure on this path degrades to "no visualization": the user still
//! gets the text answer.

use super::prompts::PromptLibrary;
use super::response_cleaner::clean;
use crate::llm::{GenerationConfig, TextGenerator};
use crate::models::VisualizationPayload;
use crate::{Error, Result};

/// Why a visualization was not attached to the reply.
#[derive(Debug)]
pub enum VisualizationSkip {
    /// The model call failed or timed out.
    Generation(Error),
    /// The cleaned output was empty.
    EmptyOutput,
    /// The cleaned output was not valid JSON.
    InvalidJson(serde_json::Error),
    /// The model answered `{}` or a non-object value.
    NotApplicable,
}

impl VisualizationSkip {
    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Generation(Error::Timeout { .. }) => "timeout",
            Self::Generation(_) => "generation_failed",
            Self::EmptyOutput => "empty_output",
            Self::InvalidJson(_) => "invalid_json",
            Self::NotApplicable => "not_applicable",
        }
    }
}

impl From<Error> for VisualizationSkip {
    fn from(err: Error) -> Self {
        Self::Generation(err)
    }
}

/// Parses cleaned model output into a payload.
///
/// # Errors
///
/// Returns the reason the output cannot be used.
pub fn parse_payload(raw: &str) -> std::result::Result<VisualizationPayload, VisualizationSkip> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return Err(VisualizationSkip::EmptyOutput);
    }
    let value: serde_json::Value =
        serde_json::from_str(&cleaned).map_err(VisualizationSkip::InvalidJson)?;
    VisualizationPayload::from_value(value).ok_or(VisualizationSkip::NotApplicable)
}

/// Asks the model for a visualization of `query`.
///
/// # Errors
///
/// Returns the reason no payload could be produced.
pub async fn generate_visualization<G: TextGenerator>(
    generator: &G,
    prompts: &PromptLibrary,
    config: &GenerationConfig,
    query: &str,
) -> std::result::Result<VisualizationPayload, VisualizationSkip> {
    let prompt = prompts.visualization_prompt(query);
    let raw: Result<String> = generator.generate(&prompt, config).await;
    parse_payload(&raw?)
}

/// Like [`generate_visualization`], but logs and swallows every failure.
pub async fn get_visualization<G: TextGenerator>(
    generator: &G,
    prompts: &PromptLibrary,
    config: &GenerationConfig,
    query: &str,
) -> Option<VisualizationPayload> {
    match generate_visualization(generator, prompts, config, query).await {
        Ok(payload) => {
            match payload.kind() {
                Some(kind) => tracing::debug!(kind = %kind, "Visualization payload generated"),
                None => tracing::debug!(
                    visualization_type = payload.visualization_type().unwrap_or("<missing>"),
                    "Visualization payload has an unrecognised type"
                ),
            }
            Some(payload)
        },
        Err(skip) => {
            let reason = skip.reason();
            match &skip {
                VisualizationSkip::Generation(err) => {
                    tracing::error!(error = %err, "Visualization generation failed");
                },
                VisualizationSkip::InvalidJson(err) => {
                    tracing::error!(error = %err, "Visualization output is not valid JSON");
                },
                VisualizationSkip::EmptyOutput | VisualizationSkip::NotApplicable => {
                    tracing::info!(reason, "No visualization produced");
                },
            }
            metrics::counter!("visualization_discarded_total", "reason" => reason).increment(1);
            None
        },
    }
}
