//! HTTP adapter - router assembly.
//!
//! Combines the liveness endpoint with the relay WebSocket route and applies
//! the CORS and tracing layers.

use ::http::{header, Method};
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, RelayState};

/// Liveness probe.
///
/// Route: `GET /`
pub async fn health() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

/// Build the application router.
///
/// # Routes
/// - `GET /` - Liveness probe
/// - `GET /ws/bedrock-chat` - Chat relay (WebSocket upgrade)
pub fn app_router(state: RelayState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(health))
        .merge(websocket_router())
        .with_state(state)
        .layer(build_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// An empty origin list allows any origin.
fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}
