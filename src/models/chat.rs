//! Chat request and reply envelope.

use super::VisualizationPayload;
use serde::{Deserialize, Serialize};

/// Reply text used when the model returns an empty answer.
pub const FALLBACK_RESPONSE: &str = "Sorry, I couldn't generate a response. Please try again.";

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The raw user query.
    pub user_input: String,
}

/// Discriminator telling the frontend whether to render a visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Plain text answer.
    #[default]
    Text,
    /// Text answer plus visualization data.
    Visualization,
}

impl ResponseType {
    /// Returns the string representation used in serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Visualization => "visualization",
        }
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reply envelope for one chat request.
///
/// `response_type` is derived from `visualization_data`, so the two can never
/// disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Natural-language answer.
    pub bot_response: String,
    /// Visualization data, serialized as `null` when absent.
    pub visualization_data: Option<VisualizationPayload>,
    /// Whether the frontend should render `visualization_data`.
    pub response_type: ResponseType,
}

impl ChatResponse {
    /// Composes the reply from the text answer and optional visualization.
    ///
    /// Blank text is replaced by [`FALLBACK_RESPONSE`].
    #[must_use]
    pub fn compose(bot_response: String, visualization_data: Option<VisualizationPayload>) -> Self {
        let bot_response = if bot_response.trim().is_empty() {
            FALLBACK_RESPONSE.to_string()
        } else {
            bot_response
        };
        let response_type = if visualization_data.is_some() {
            ResponseType::Visualization
        } else {
            ResponseType::Text
        };

        Self {
            bot_response,
            visualization_data,
            response_type,
        }
    }
}
