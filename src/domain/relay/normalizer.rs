//! Response normalization.
//!
//! Turns any recognized [`AgentResponse`] shape into plain completion text.
//! The function is pure: no I/O, no logging, no external calls.

use thiserror::Error;

use super::response::AgentResponse;
use super::stream_decoder::{decode_event_stream, DecodeError};

/// Legacy text emitted for a completion field of unknown shape.
pub const UNEXPECTED_FORMAT_SENTINEL: &str = "Error: Unexpected response format";

/// Variant of [`UNEXPECTED_FORMAT_SENTINEL`] emitted by older relays.
pub const UNEXPECTED_COMPLETION_KEY_SENTINEL: &str =
    "Error: Unexpected response format in completion key";

/// Legacy text emitted when the reply has no completion at all.
pub const UNPROCESSABLE_SENTINEL: &str = "Error: Unable to process response";

/// Why a response could not be turned into completion text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// A streamed or binary payload was not valid UTF-8.
    #[error("failed to decode completion: {0}")]
    Decode(#[from] DecodeError),

    /// A completion field was present in an unknown shape.
    #[error("Error: Unexpected response format")]
    UnexpectedFormat { reason: String },

    /// The response carried no completion field.
    #[error("Error: Unable to process response")]
    Unprocessable,
}

impl NormalizeError {
    /// The legacy sentinel text for this error, if it has one.
    ///
    /// Decode failures have no sentinel; they were always reported as errors.
    pub fn legacy_sentinel(&self) -> Option<&'static str> {
        match self {
            Self::Decode(_) => None,
            Self::UnexpectedFormat { .. } => Some(UNEXPECTED_FORMAT_SENTINEL),
            Self::Unprocessable => Some(UNPROCESSABLE_SENTINEL),
        }
    }
}

/// Returns true if `text` is one of the legacy error sentinels rather than
/// genuine agent output.
pub fn is_legacy_sentinel(text: &str) -> bool {
    matches!(
        text,
        UNEXPECTED_FORMAT_SENTINEL | UNEXPECTED_COMPLETION_KEY_SENTINEL | UNPROCESSABLE_SENTINEL
    )
}

/// Extracts the completion text from an agent response.
pub fn normalize(response: &AgentResponse) -> Result<String, NormalizeError> {
    match response {
        AgentResponse::StreamingCompletion(events) => Ok(decode_event_stream(Some(events))?),
        AgentResponse::BinaryCompletion(bytes) => String::from_utf8(bytes.clone()).map_err(|e| {
            NormalizeError::Decode(DecodeError {
                chunk_index: 0,
                source: e.utf8_error(),
            })
        }),
        AgentResponse::TextCompletion(text) => Ok(text.clone()),
        AgentResponse::Unrecognized(reason) => Err(NormalizeError::UnexpectedFormat {
            reason: reason.clone(),
        }),
        AgentResponse::Missing => Err(NormalizeError::Unprocessable),
    }
}
