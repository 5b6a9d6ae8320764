//! Agent response shapes.
//!
//! The agent service has answered in several encodings over time. Rather than
//! probing the reply ad hoc wherever it is consumed, the reply is decoded once,
//! at the boundary, into the closed [`AgentResponse`] sum type.
//!
//! Shapes are recognized in priority order:
//!
//! 1. `completionStream` field → [`AgentResponse::StreamingCompletion`]
//! 2. `completion` holding `{ "bytes": <base64> }` → [`AgentResponse::BinaryCompletion`]
//! 3. `completion` holding a list of events → [`AgentResponse::StreamingCompletion`]
//! 4. `completion` holding a string → [`AgentResponse::TextCompletion`]
//! 5. `completion` of any other shape → [`AgentResponse::Unrecognized`]
//! 6. neither field → [`AgentResponse::Missing`]

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Field carrying a streamed completion.
pub const COMPLETION_STREAM_FIELD: &str = "completionStream";

/// Field carrying a completion in any of its encodings.
pub const COMPLETION_FIELD: &str = "completion";

/// One binary fragment of a streamed completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadPart {
    /// Raw payload bytes (base64 on the JSON wire). Absent when the part
    /// only carries attribution.
    #[serde(default, with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl PayloadPart {
    /// Creates a payload part from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

/// A unit of a chunked response.
///
/// Events without a chunk (trace, attribution, ...) are carried through so that
/// ordering is preserved, but contribute no text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<PayloadPart>,
}

impl StreamEvent {
    /// An event carrying a text chunk.
    pub fn chunk(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            chunk: Some(PayloadPart::new(bytes)),
        }
    }

    /// An event with no chunk payload.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A reply from the agent service, decoded into one of the known shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentResponse {
    /// Completion delivered as an ordered sequence of stream events.
    StreamingCompletion(Vec<StreamEvent>),
    /// Completion delivered as a single binary payload.
    BinaryCompletion(Vec<u8>),
    /// Completion delivered as plain text.
    TextCompletion(String),
    /// A completion field was present but its shape is not one we understand.
    Unrecognized(String),
    /// No completion field at all.
    Missing,
}

impl AgentResponse {
    /// Decodes a JSON reply into its response shape.
    ///
    /// Never fails: malformed or unknown shapes become
    /// [`AgentResponse::Unrecognized`] with a short description.
    pub fn from_json(value: &Value) -> Self {
        if let Some(stream) = value.get(COMPLETION_STREAM_FIELD) {
            return match stream {
                Value::Null => Self::StreamingCompletion(Vec::new()),
                Value::Array(_) => match decode_events(stream) {
                    Ok(events) => Self::StreamingCompletion(events),
                    Err(reason) => Self::Unrecognized(reason),
                },
                other => Self::Unrecognized(format!(
                    "{} holds a {}",
                    COMPLETION_STREAM_FIELD,
                    json_kind(other)
                )),
            };
        }

        let Some(completion) = value.get(COMPLETION_FIELD) else {
            return Self::Missing;
        };

        match completion {
            Value::Object(map) if map.contains_key("bytes") => {
                match serde_json::from_value::<PayloadPart>(completion.clone()) {
                    Ok(part) => Self::BinaryCompletion(part.bytes),
                    Err(e) => Self::Unrecognized(format!("invalid completion bytes: {}", e)),
                }
            }
            Value::Array(_) => match decode_events(completion) {
                Ok(events) => Self::StreamingCompletion(events),
                Err(reason) => Self::Unrecognized(reason),
            },
            Value::String(text) => Self::TextCompletion(text.clone()),
            other => Self::Unrecognized(format!(
                "{} holds a {}",
                COMPLETION_FIELD,
                json_kind(other)
            )),
        }
    }

    /// Short name of the shape, for logging.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::StreamingCompletion(_) => "streaming_completion",
            Self::BinaryCompletion(_) => "binary_completion",
            Self::TextCompletion(_) => "text_completion",
            Self::Unrecognized(_) => "unrecognized",
            Self::Missing => "missing",
        }
    }
}

fn decode_events(value: &Value) -> Result<Vec<StreamEvent>, String> {
    serde_json::from_value(value.clone()).map_err(|e| format!("invalid stream event: {}", e))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serde adapter for base64-encoded byte fields.
mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
