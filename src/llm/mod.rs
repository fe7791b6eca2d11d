//! Remote generative model abstraction.
//!
//! The chat pipeline only needs one capability from the model:
//! `generate(prompt, config) -> text`. [`TextGenerator`] captures it so the
//! Gemini client, the timeout wrapper and test doubles are interchangeable.

mod gemini;
mod resilience;

pub use gemini::GeminiClient;
pub use resilience::ResilientGenerator;

use crate::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Trait for remote text generators.
pub trait TextGenerator: Send + Sync {
    /// The provider name, used as a metrics and log label.
    fn name(&self) -> &'static str;

    /// Generates text for a fully composed prompt.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Service`] or [`crate::Error::Timeout`] when the
    /// remote model cannot produce a response.
    fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Output format a generation call may force on the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// The model must answer with a single JSON document.
    Json,
}

impl ResponseFormat {
    /// Returns the MIME type sent to the model.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
        }
    }
}

/// Sampling parameters for one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling probability mass.
    pub top_p: f32,
    /// Top-k sampling limit.
    pub top_k: u32,
    /// Maximum number of tokens to generate.
    pub max_output_tokens: u32,
    /// Forced output format, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl GenerationConfig {
    /// Settings for the structured visualization call.
    #[must_use]
    pub const fn visualization() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_format: Some(ResponseFormat::Json),
        }
    }

    /// Settings for the conversational text call.
    #[must_use]
    pub const fn conversation() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
            response_format: None,
        }
    }

    /// Short label describing the call kind, used in logs and metrics.
    #[must_use]
    pub const fn operation_label(&self) -> &'static str {
        match self.response_format {
            Some(ResponseFormat::Json) => "json",
            None => "text",
        }
    }
}

/// The two generation settings the chat pipeline uses.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProfiles {
    /// Settings for the visualization JSON call.
    pub visualization: GenerationConfig,
    /// Settings for the conversational text call.
    pub conversation: GenerationConfig,
}

impl Default for GenerationProfiles {
    fn default() -> Self {
        Self {
            visualization: GenerationConfig::visualization(),
            conversation: GenerationConfig::conversation(),
        }
    }
}

/// HTTP client configuration for the model API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Builds HTTP settings from the LLM section of the config.
    ///
    /// The request timeout is always set; see [`LlmConfig::call_timeout`].
    ///
    /// [`LlmConfig::call_timeout`]: crate::config::LlmConfig::call_timeout
    #[must_use]
    pub const fn from_config(config: &crate::config::LlmConfig) -> Self {
        Self {
            timeout_ms: config.call_timeout_ms(),
            connect_timeout_ms: config.connect_timeout_ms,
        }
    }

    /// Returns the request timeout, if enabled.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }
}

/// Builds an async HTTP client for model requests with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build LLM HTTP client: {err}");
        reqwest::Client::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_differ_in_format_and_budget() {
        let profiles = GenerationProfiles::default();
        assert_eq!(
            profiles.visualization.response_format,
            Some(ResponseFormat::Json)
        );
        assert_eq!(profiles.conversation.response_format, None);
        assert!(profiles.visualization.max_output_tokens > profiles.conversation.max_output_tokens);
    }

    #[test]
    fn test_operation_label() {
        assert_eq!(GenerationConfig::visualization().operation_label(), "json");
        assert_eq!(GenerationConfig::conversation().operation_label(), "text");
    }

    #[test]
    fn test_generation_config_from_toml_without_format() {
        let config: GenerationConfig = toml::from_str(
            "temperature = 0.5\ntop_p = 0.9\ntop_k = 20\nmax_output_tokens = 512\n",
        )
        .unwrap();
        assert_eq!(config.response_format, None);
        assert_eq!(config.top_k, 20);

        let config: GenerationConfig = toml::from_str(
            "temperature = 0.1\ntop_p = 1.0\ntop_k = 1\nmax_output_tokens = 64\nresponse_format = \"json\"\n",
        )
        .unwrap();
        assert_eq!(config.response_format, Some(ResponseFormat::Json));
    }

    #[test]
    fn test_http_config_zero_disables_timeout() {
        let config = LlmHttpConfig {
            timeout_ms: 0,
            connect_timeout_ms: 0,
        };
        assert_eq!(config.timeout(), None);
        assert_eq!(
            LlmHttpConfig::default().timeout(),
            Some(Duration::from_secs(30))
        );
    }
}
