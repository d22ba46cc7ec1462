//! HTTP surface — the `/message` endpoint plus health, behind CORS.
//!
//! Transport concerns stop here: the handler decodes the body into a
//! plain JSON mapping and hands it to the pipeline, which has no idea
//! what wire encoding the submission arrived in.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::pipeline::{ApiResponse, RequestPipeline};

/// Client-token request header, passed through opaquely.
const API_TOKEN_HEADER: HeaderName = HeaderName::from_static("api-token");

/// Token-expiry hint response header, passed through opaquely.
const API_TOKEN_EXPIRY_HEADER: HeaderName = HeaderName::from_static("api-token-expiry");

/// Shared state for the message routes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
}

/// Build the router for the relay.
pub fn message_routes(pipeline: Arc<RequestPipeline>, cors: CorsLayer) -> Router {
    let state = AppState { pipeline };

    Router::new()
        .route("/message", post(post_message))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// CORS layer restricted to the configured origin allow-list.
/// Origins that fail to parse as header values are skipped with a
/// warning rather than aborting startup.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, API_TOKEN_HEADER])
        .expose_headers([API_TOKEN_EXPIRY_HEADER])
}

// ── Handlers ────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "contact-relay"
    }))
}

async fn post_message(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> ApiResponse {
    state.pipeline.handle(payload).await
}

// ── Tests ───────────────────────────────────────────────────────────
