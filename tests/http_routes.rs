//! Integration tests for the plain HTTP routes of the relay router.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use bedrock_relay::adapters::http::app_router;
use bedrock_relay::adapters::mock::{MockAgentRuntime, MockGuardrail};
use bedrock_relay::adapters::websocket::RelayState;
use bedrock_relay::application::{RelayHandlerConfig, RelayMessageHandler, SafetyFilter};
use bedrock_relay::ports::AgentTarget;

fn router(cors_origins: &[String]) -> axum::Router {
    let handler = RelayMessageHandler::new(
        Arc::new(MockAgentRuntime::new()),
        SafetyFilter::new(Arc::new(MockGuardrail::new()), None),
        AgentTarget::new("AGENT1", "ALIAS1", "session-1"),
        RelayHandlerConfig::default(),
    );
    app_router(RelayState::new(Arc::new(handler)), cors_origins)
}

#[tokio::test]
async fn liveness_returns_hello_world() {
    let response = router(&[])
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"message": "Hello World"}));
}

#[tokio::test]
async fn relay_route_requires_websocket_upgrade() {
    let response = router(&[])
        .oneshot(
            Request::builder()
                .uri("/ws/bedrock-chat")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = router(&[])
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn configured_origin_is_allowed() {
    let origin = "http://localhost:3000";
    let response = router(&[origin.to_string()])
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        origin
    );
}
