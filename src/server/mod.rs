//! HTTP surface.
//!
//! | Route | Method | Body |
//! |-------|--------|------|
//! | `/chat` | POST | `{"user_input"}` → `ChatResponse` |
//! | `/health` | GET | `{"status": "OK"}` |
//! | `/metrics` | GET | Prometheus text, only when metrics are enabled |

mod error;
mod handlers;

pub use error::ApiError;

use crate::config::ServerConfig;
use crate::llm::TextGenerator;
use crate::services::ChatService;
use crate::{Error, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MiB).
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// Builds the application router.
pub fn build_router<G: TextGenerator + 'static>(
    service: Arc<ChatService<G>>,
    config: &ServerConfig,
    metrics: Option<PrometheusHandle>,
) -> Router {
    let mut app = Router::new()
        .route("/chat", post(handlers::chat::<G>))
        .route("/health", get(handlers::health));

    if let Some(handle) = metrics {
        app = app.route("/metrics", get(move || async move { handle.render() }));
    }

    app.layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE))
        // Security headers (OWASP recommendations)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// CORS for the configured origins, with credentials and mirrored methods and headers.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            if origin == "*" {
                tracing::warn!("Wildcard CORS origin is not allowed with credentials, skipping");
                return None;
            }
            HeaderValue::from_str(origin)
                .inspect_err(|e| tracing::warn!(origin, error = %e, "Invalid CORS origin, skipping"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Binds the configured address and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve<G: TextGenerator + 'static>(
    service: Arc<ChatService<G>>,
    config: &ServerConfig,
    metrics: Option<PrometheusHandle>,
) -> Result<()> {
    let app = build_router(service, config, metrics);
    let addr = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "bind".to_string(),
            cause: format!("{addr}: {e}"),
        })?;
    tracing::info!(address = %addr, origins = ?config.allowed_origins, "Starting vizchat HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "serve".to_string(),
            cause: e.to_string(),
        })?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
