//! Request and response types for the chat endpoint.

mod chat;
mod visualization;

pub use chat::{ChatRequest, ChatResponse, FALLBACK_RESPONSE, ResponseType};
pub use visualization::{VisualizationKind, VisualizationPayload};
