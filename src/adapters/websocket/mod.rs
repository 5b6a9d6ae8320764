//! WebSocket adapter for the chat relay.
//!
//! ```text
//! client ──{"content"}──► handler ──► RelayMessageHandler ──► agent / guardrail
//!        ◄─{"response"}──         ◄── RelayOutcome | RelayError
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`handler`] - Axum WebSocket upgrade handler and receive loop

pub mod handler;
pub mod messages;

pub use handler::{websocket_router, ws_handler, RelayState, RELAY_PATH};
pub use messages::{InboundMessage, OutboundMessage};
