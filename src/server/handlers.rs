//! Route handlers.

use super::error::ApiError;
use crate::llm::TextGenerator;
use crate::models::{ChatRequest, ChatResponse};
use crate::services::ChatService;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;
use tracing::Instrument;

/// `POST /chat`.
pub async fn chat<G: TextGenerator + 'static>(
    State(service): State<Arc<ChatService<G>>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "chat.request",
        request_id = %request_id,
        intent = tracing::field::Empty
    );

    async move {
        let Json(request) = payload.map_err(|rejection| {
            tracing::warn!(error = %rejection.body_text(), "Rejected chat request body");
            metrics::counter!("chat_request_failures_total", "reason" => "bad_request")
                .increment(1);
            ApiError::from(rejection)
        })?;

        let response = service.respond(&request.user_input).await?;
        Ok::<_, ApiError>(Json(response))
    }
    .instrument(span)
    .await
}

/// `GET /health`.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}
