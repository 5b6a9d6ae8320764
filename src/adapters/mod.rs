//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `bedrock` - AWS Bedrock agent runtime and guardrail clients
//! - `mock` - In-process agent and guardrail for tests and local runs
//! - `websocket` - Chat relay WebSocket endpoint
//! - `http` - Router assembly and liveness endpoint

pub mod bedrock;
pub mod http;
pub mod mock;
pub mod websocket;

pub use bedrock::{BedrockAgentRuntime, BedrockClientConfig, BedrockGuardrail};
pub use http::app_router;
pub use mock::{MockAgentRuntime, MockGuardrail};
