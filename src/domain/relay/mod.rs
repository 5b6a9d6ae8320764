//! Relay domain - agent response shapes and their normalization.
//!
//! - `response` - Closed set of agent reply shapes, decoded at the boundary
//! - `stream_decoder` - Folds chunked stream events into text
//! - `normalizer` - Extracts completion text from any recognized shape

pub mod normalizer;
pub mod response;
pub mod stream_decoder;

pub use normalizer::{
    is_legacy_sentinel, normalize, NormalizeError, UNEXPECTED_COMPLETION_KEY_SENTINEL,
    UNEXPECTED_FORMAT_SENTINEL, UNPROCESSABLE_SENTINEL,
};
pub use response::{AgentResponse, PayloadPart, StreamEvent};
pub use stream_decoder::{decode_event_stream, DecodeError};
