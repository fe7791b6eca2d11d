//! End-to-end tests for the HTTP surface.
//!
//! Requests go through the full router (CORS, body limit, handlers) with a
//! scripted generator in place of the remote model.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use vizchat::config::ServerConfig;
use vizchat::llm::{GenerationConfig, GenerationProfiles, ResilientGenerator, TextGenerator};
use vizchat::server::{MAX_REQUEST_BODY_SIZE, build_router};
use vizchat::services::{ChatService, PromptLibrary};
use vizchat::{Error, Result};

/// Replies to JSON-mode and text calls from fixed scripts and counts calls.
#[derive(Default)]
struct Scripted {
    json_reply: Option<std::result::Result<String, String>>,
    text_reply: Option<std::result::Result<String, String>>,
    delay: Option<Duration>,
    json_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl Scripted {
    fn text(reply: &str) -> Self {
        Self {
            text_reply: Some(Ok(reply.to_string())),
            ..Self::default()
        }
    }

    fn with_json(mut self, reply: &str) -> Self {
        self.json_reply = Some(Ok(reply.to_string()));
        self
    }

    fn with_json_error(mut self, cause: &str) -> Self {
        self.json_reply = Some(Err(cause.to_string()));
        self
    }

    fn with_text_error(mut self, cause: &str) -> Self {
        self.text_reply = Some(Err(cause.to_string()));
        self
    }
}

impl TextGenerator for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        self.calls.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let json_mode = config.response_format.is_some();
        if let Some(delay) = self.json_delay.filter(|_| json_mode) {
            tokio::time::sleep(delay).await;
        }
        let reply = if json_mode {
            &self.json_reply
        } else {
            &self.text_reply
        };
        match reply.clone().expect("unexpected generation call") {
            Ok(text) => Ok(text),
            Err(cause) => Err(Error::Service {
                operation: "scripted_generate".to_string(),
                cause,
            }),
        }
    }
}

fn service<G: TextGenerator>(generator: G) -> Arc<ChatService<G>> {
    Arc::new(ChatService::new(
        generator,
        PromptLibrary::default(),
        GenerationProfiles::default(),
    ))
}

fn router<G: TextGenerator + 'static>(service: Arc<ChatService<G>>) -> Router {
    build_router(service, &ServerConfig::default(), None)
}

fn chat_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn post_chat(app: Router, user_input: &str) -> (StatusCode, Value) {
    let body = json!({ "user_input": user_input }).to_string();
    let response = app.oneshot(chat_request(body)).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================================
// POST /chat
// ============================================================================

mod chat {
    use super::*;

    #[tokio::test]
    async fn test_general_query_returns_text() {
        let service = service(Scripted::text("Hello! How can I help?"));
        let (status, body) = post_chat(router(service.clone()), "hello there").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "bot_response": "Hello! How can I help?",
                "visualization_data": null,
                "response_type": "text"
            })
        );
        assert_eq!(service.generator().calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_visualization_query_returns_payload() {
        let generator = Scripted::text("Bubble sort repeatedly swaps adjacent elements.").with_json(
            "```json\n{\"visualizationType\":\"sorting\",\"algorithm\":\"bubble_sort\",\"steps\":[{\"array\":[3,1,2],\"message\":\"Initial array\"}]}\n```",
        );
        let service = service(generator);
        let (status, body) = post_chat(router(service.clone()), "Visualize bubble sort").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response_type"], "visualization");
        assert_eq!(body["visualization_data"]["visualizationType"], "sorting");
        assert_eq!(body["visualization_data"]["steps"][0]["array"], json!([3, 1, 2]));
        assert_eq!(
            body["bot_response"],
            "Bubble sort repeatedly swaps adjacent elements."
        );
        assert_eq!(service.generator().calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_tutor_query_makes_one_call() {
        let service = service(Scripted::text("Recursion is a function calling itself."));
        let (status, body) = post_chat(router(service.clone()), "explain recursion").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response_type"], "text");
        let calls = service.generator().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with("User Query: explain recursion"));
        assert!(calls[0].contains("computer-science tutor"));
    }

    #[tokio::test]
    async fn test_visualization_failure_still_answers() {
        let generator = Scripted::text("Here is how a stack works.").with_json_error("quota exceeded");
        let (status, body) = post_chat(router(service(generator)), "show me a stack").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response_type"], "text");
        assert_eq!(body["visualization_data"], Value::Null);
        assert_eq!(body["bot_response"], "Here is how a stack works.");
    }

    #[tokio::test]
    async fn test_empty_object_means_no_visualization() {
        let generator = Scripted::text("Philosophy is not an algorithm.").with_json("{}");
        let (status, body) = post_chat(router(service(generator)), "visualize happiness").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response_type"], "text");
        assert_eq!(body["visualization_data"], Value::Null);
    }

    #[tokio::test]
    async fn test_empty_model_text_uses_fallback() {
        let (status, body) = post_chat(router(service(Scripted::text(""))), "hello").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["bot_response"],
            "Sorry, I couldn't generate a response. Please try again."
        );
    }
}

// ============================================================================
// Error responses
// ============================================================================

mod errors {
    use super::*;

    #[tokio::test]
    async fn test_blank_input_is_bad_request() {
        let service = service(Scripted::default());
        for blank in ["", "   ", "\n\t"] {
            let (status, body) = post_chat(router(service.clone()), blank).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "detail": "Input cannot be empty." }));
        }
        assert!(service.generator().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conversation_failure_is_server_error() {
        let generator = Scripted::default()
            .with_json("{\"visualizationType\":\"graph\"}")
            .with_text_error("API returned status: 503 Service Unavailable");
        let (status, body) = post_chat(router(service(generator)), "visualize a graph").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["detail"],
            "Error communicating with AI service: API returned status: 503 Service Unavailable"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_conversation_timeout_is_server_error() {
        let generator = Scripted {
            delay: Some(Duration::from_secs(60)),
            ..Scripted::text("too late")
        };
        let generator = ResilientGenerator::new(generator, Duration::from_millis(100));
        let (status, body) = post_chat(router(service(generator)), "hello").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Error communicating with AI service:"));
        assert!(detail.contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_visualization_timeout_degrades_to_text() {
        let generator = Scripted {
            json_delay: Some(Duration::from_secs(60)),
            ..Scripted::text("Bubble sort swaps neighbours.")
                .with_json("{\"visualizationType\":\"sorting\",\"steps\":[]}")
        };
        let generator = ResilientGenerator::new(generator, Duration::from_millis(100));
        let (status, body) = post_chat(router(service(generator)), "visualize bubble sort").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response_type"], "text");
        assert_eq!(body["visualization_data"], Value::Null);
        assert_eq!(body["bot_response"], "Bubble sort swaps neighbours.");
    }

    #[tokio::test]
    async fn test_malformed_json_is_unprocessable() {
        let app = router(service(Scripted::default()));
        for body in ["{not json", "{}", r#"{"user_input": 42}"#] {
            let response = app.clone().oneshot(chat_request(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value: Value = serde_json::from_slice(&bytes).unwrap();
            assert!(value["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let input = "a".repeat(MAX_REQUEST_BODY_SIZE + 1);
        let body = json!({ "user_input": input }).to_string();
        let response = router(service(Scripted::default()))
            .oneshot(chat_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

// ============================================================================
// Health, CORS and headers
// ============================================================================

mod surface {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let response = router(service(Scripted::default()))
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({ "status": "OK" }));
    }

    #[tokio::test]
    async fn test_cors_preflight_for_allowed_origin() {
        let response = router(service(Scripted::default()))
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/chat")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "POST"
        );
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let response = router(service(Scripted::text("hi")))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header(header::ORIGIN, "https://evil.example")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"user_input":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_metrics_route_absent_when_disabled() {
        let response = router(service(Scripted::default()))
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
