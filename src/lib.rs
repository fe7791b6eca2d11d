//! # Vizchat
//!
//! An intent-routing chat backend for an algorithm-visualization tutor.
//!
//! Vizchat accepts a free-text question, decides whether it is a general
//! question, a computer-science tutoring question or a request to see an
//! algorithm in action, and forwards it to a Gemini model with the matching
//! instruction template. Visualization requests additionally ask the model
//! for a structured JSON payload that the frontend renders step by step.
//!
//! ## Features
//!
//! - Keyword intent classification with fixed precedence
//! - Prompt library with config-file overrides
//! - Concurrent text and visualization generation with bounded timeouts
//! - Silent degradation when visualization data cannot be produced
//! - axum HTTP surface (`/chat`, `/health`, optional `/metrics`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vizchat::llm::{GeminiClient, GenerationProfiles, ResilientGenerator};
//! use vizchat::services::{ChatService, PromptLibrary};
//!
//! let generator = ResilientGenerator::new(GeminiClient::new(api_key), timeout);
//! let service = ChatService::new(generator, PromptLibrary::default(), GenerationProfiles::default());
//! let reply = service.respond("visualize bubble sort").await?;
//! assert_eq!(reply.response_type.as_str(), "visualization");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod intent;
pub mod llm;
pub mod models;
pub mod observability;
pub mod server;
pub mod services;

pub use config::VizchatConfig;
pub use intent::{Intent, classify};
pub use llm::{GenerationConfig, TextGenerator};
pub use models::{ChatRequest, ChatResponse, ResponseType, VisualizationPayload};
pub use services::{ChatService, PromptLibrary};

/// Error type for vizchat operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Empty query after trimming, malformed request body |
/// | `Service` | Remote model transport failure, non-success status, unusable response |
/// | `Timeout` | A remote model call exceeded its time budget |
/// | `OperationFailed` | Config file, bind, logging or metrics setup failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - The user query is empty or whitespace-only
    /// - The request body is not valid JSON for the endpoint
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The remote generative model failed.
    ///
    /// Raised when:
    /// - The HTTP request to the model cannot be sent (connect, DNS, TLS)
    /// - The model returns a non-success status (auth, quota, server error)
    /// - The response body cannot be decoded or carries no candidates
    #[error("service '{operation}' failed: {cause}")]
    Service {
        /// The remote operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A remote model call did not finish in time.
    #[error("service '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The remote operation that timed out.
        operation: String,
        /// The budget that was exceeded.
        timeout_ms: u64,
    },

    /// A local operation failed.
    ///
    /// Raised when:
    /// - The config file cannot be read or parsed
    /// - The model API key is missing at startup
    /// - The listener cannot bind or the server exits with an error
    /// - Logging or metrics cannot be initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns true for failures of the remote model, timeouts included.
    #[must_use]
    pub const fn is_service_error(&self) -> bool {
        matches!(self, Self::Service { .. } | Self::Timeout { .. })
    }
}

/// Result type alias for vizchat operations.
pub type Result<T> = std::result::Result<T, Error>;
