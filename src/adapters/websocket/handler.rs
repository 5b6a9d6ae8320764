//! WebSocket upgrade handler for chat relay connections.
//!
//! Each connection runs its own receive loop:
//! 1. Upgrade to WebSocket
//! 2. For each text frame, relay the message and send back one reply
//! 3. Stop on close frame, end of stream, or receive error
//!
//! Failures on a single message are reported as error frames; the
//! connection stays open.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use uuid::Uuid;

use crate::application::handlers::{ErrorKind, RelayMessageCommand, RelayMessageHandler};

use super::messages::{InboundMessage, OutboundMessage};

/// Route of the chat relay endpoint.
pub const RELAY_PATH: &str = "/ws/bedrock-chat";

/// State required for WebSocket handling.
///
/// Only immutable, shared components; nothing here is per-connection.
#[derive(Clone)]
pub struct RelayState {
    pub handler: Arc<RelayMessageHandler>,
}

impl RelayState {
    /// Create a new relay state.
    pub fn new(handler: Arc<RelayMessageHandler>) -> Self {
        Self { handler }
    }
}

/// Handle WebSocket upgrade requests for the chat relay.
///
/// Route: `GET /ws/bedrock-chat`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<RelayState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection until it closes.
async fn handle_socket(socket: WebSocket, state: RelayState) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = Uuid::new_v4();

    tracing::info!(connection_id = %connection_id, "Relay connection opened");

    while let Some(result) = receiver.next().await {
        let reply = match result {
            Ok(Message::Text(text)) => relay_text(&state, connection_id, &text).await,
            Ok(Message::Binary(_)) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    "Received unsupported binary message"
                );
                OutboundMessage::error(ErrorKind::InvalidFrame, "binary frames are not supported")
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Answered by axum
                continue;
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                break;
            }
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                break;
            }
        };

        if let Err(e) = send_message(&mut sender, &reply).await {
            tracing::debug!(
                connection_id = %connection_id,
                "Send error, closing connection: {}",
                e
            );
            break;
        }
    }

    tracing::info!(connection_id = %connection_id, "Relay connection closed");
}

/// Parse one text frame and run it through the relay.
async fn relay_text(state: &RelayState, connection_id: Uuid, text: &str) -> OutboundMessage {
    let inbound: InboundMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, "Invalid inbound frame: {}", e);
            return OutboundMessage::error(ErrorKind::InvalidFrame, format!("invalid message: {}", e));
        }
    };

    tracing::debug!(
        connection_id = %connection_id,
        length = inbound.content.len(),
        "Relaying message"
    );

    match state
        .handler
        .handle(RelayMessageCommand::new(inbound.content))
        .await
    {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                kind = ?e.kind,
                "Relay failed: {}",
                e
            );
            e.into()
        }
    }
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &OutboundMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Create axum router for the relay endpoint.
pub fn websocket_router() -> axum::Router<RelayState> {
    use axum::routing::get;

    axum::Router::new().route(RELAY_PATH, get(ws_handler))
}
