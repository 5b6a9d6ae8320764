//! WebSocket message types for the chat relay.
//!
//! Defines the protocol between the relay and connected clients:
//! - Client → Server: `{"content": "..."}`
//! - Server → Client: `{"response": "..." | null}` or `{"error": "...", "kind": "..."}`

use serde::{Deserialize, Serialize};

use crate::application::handlers::{ErrorKind, RelayError, RelayOutcome};

// ============================================
// Client → Server Messages
// ============================================

/// A chat message from the client.
///
/// Missing or null `content` is treated as empty; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================
// Server → Client Messages
// ============================================

/// All message types sent from the relay to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// Completion text, or `null` when it was suppressed.
    Response { response: Option<String> },

    /// A failed message; the session stays open.
    Error { error: String, kind: ErrorKind },
}

impl OutboundMessage {
    /// Builds an error frame.
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
            kind,
        }
    }
}

impl From<RelayOutcome> for OutboundMessage {
    fn from(outcome: RelayOutcome) -> Self {
        Self::Response {
            response: outcome.into_response(),
        }
    }
}

impl From<RelayError> for OutboundMessage {
    fn from(err: RelayError) -> Self {
        Self::Error {
            error: err.message,
            kind: err.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inbound_reads_content() {
        let msg: InboundMessage = serde_json::from_str(r#"{"content":"Hi","extra":1}"#).unwrap();
        assert_eq!(msg.content, "Hi");
    }

    #[test]
    fn inbound_missing_or_null_content_is_empty() {
        let missing: InboundMessage = serde_json::from_str("{}").unwrap();
        let null: InboundMessage = serde_json::from_str(r#"{"content":null}"#).unwrap();
        assert_eq!(missing.content, "");
        assert_eq!(null.content, "");
    }

    #[test]
    fn inbound_rejects_non_object_json() {
        assert!(serde_json::from_str::<InboundMessage>("not json").is_err());
        assert!(serde_json::from_str::<InboundMessage>(r#"{"content":5}"#).is_err());
    }

    #[test]
    fn response_serializes_text_and_null() {
        let delivered = OutboundMessage::from(RelayOutcome::Delivered("Hi there".to_string()));
        assert_eq!(serde_json::to_value(&delivered).unwrap(), json!({"response": "Hi there"}));

        let suppressed = OutboundMessage::from(RelayOutcome::OutputSuppressed);
        assert_eq!(serde_json::to_value(&suppressed).unwrap(), json!({"response": null}));
    }

    #[test]
    fn error_serializes_message_and_kind() {
        let msg = OutboundMessage::from(RelayError::new(ErrorKind::AgentFailure, "timeout"));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"error": "timeout", "kind": "agent_failure"})
        );
    }
}
