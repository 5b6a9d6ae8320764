//! Stream decoding.
//!
//! Folds an ordered sequence of [`StreamEvent`]s into a single completion
//! string. Only events carrying a non-empty chunk contribute; each chunk is
//! decoded as UTF-8 on its own and appended in arrival order.

use std::str::Utf8Error;

use thiserror::Error;

use super::response::StreamEvent;

/// A chunk in the stream was not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("chunk {chunk_index} is not valid UTF-8: {source}")]
pub struct DecodeError {
    /// Position of the offending event in the sequence.
    pub chunk_index: usize,
    #[source]
    pub source: Utf8Error,
}

/// Accumulates the text carried by a sequence of stream events.
///
/// An absent or empty sequence yields the empty string. A decode failure on
/// any chunk fails the whole sequence; partial output is never returned.
pub fn decode_event_stream(events: Option<&[StreamEvent]>) -> Result<String, DecodeError> {
    let mut completion = String::new();

    for (chunk_index, event) in events.unwrap_or_default().iter().enumerate() {
        let Some(chunk) = event.chunk.as_ref().filter(|c| !c.bytes.is_empty()) else {
            continue;
        };
        let text = std::str::from_utf8(&chunk.bytes)
            .map_err(|source| DecodeError { chunk_index, source })?;
        completion.push_str(text);
    }

    Ok(completion)
}
