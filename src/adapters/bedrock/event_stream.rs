//! Codec for the `application/vnd.amazon.eventstream` framing.
//!
//! Each message on the wire is laid out as:
//!
//! ```text
//! ┌──────────────┬───────────────┬─────────────┬─────────┬─────────┬─────────────┐
//! │ total len u32│ header len u32│ prelude crc │ headers │ payload │ message crc │
//! └──────────────┴───────────────┴─────────────┴─────────┴─────────┴─────────────┘
//! ```
//!
//! All integers are big-endian; both checksums are CRC32. Headers are
//! `name_len:u8 name type:u8 value`, with the value layout determined by type.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

const PRELUDE_LEN: usize = 12;
const CRC_LEN: usize = 4;
const MIN_MESSAGE_LEN: usize = PRELUDE_LEN + CRC_LEN;
const MAX_MESSAGE_LEN: usize = 16 * 1024 * 1024;

/// Errors reading or writing event-stream frames.
#[derive(Debug, Error)]
pub enum EventStreamError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid message length {0}")]
    InvalidLength(usize),

    #[error("prelude checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    PreludeChecksum { expected: u32, actual: u32 },

    #[error("message checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    MessageChecksum { expected: u32, actual: u32 },

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// A typed header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Bool(bool),
    Byte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    ByteArray(Bytes),
    String(String),
    Timestamp(i64),
    Uuid([u8; 16]),
}

impl HeaderValue {
    fn type_id(&self) -> u8 {
        match self {
            Self::Bool(true) => 0,
            Self::Bool(false) => 1,
            Self::Byte(_) => 2,
            Self::Int16(_) => 3,
            Self::Int32(_) => 4,
            Self::Int64(_) => 5,
            Self::ByteArray(_) => 6,
            Self::String(_) => 7,
            Self::Timestamp(_) => 8,
            Self::Uuid(_) => 9,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A named header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: HeaderValue,
}

impl Header {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: HeaderValue::String(value.into()),
        }
    }
}

/// One event-stream message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub headers: Vec<Header>,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(headers: Vec<Header>, payload: impl Into<Bytes>) -> Self {
        Self {
            headers,
            payload: payload.into(),
        }
    }

    /// Looks up a string header by name.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name == name)
            .and_then(|h| h.value.as_str())
    }
}

/// Decoder and encoder for event-stream frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventStreamCodec;

impl EventStreamCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for EventStreamCodec {
    type Item = Frame;
    type Error = EventStreamError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, EventStreamError> {
        if src.len() < PRELUDE_LEN {
            return Ok(None);
        }

        let total_len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;
        let headers_len = u32::from_be_bytes([src[4], src[5], src[6], src[7]]) as usize;
        let prelude_crc = u32::from_be_bytes([src[8], src[9], src[10], src[11]]);

        let actual = crc32fast::hash(&src[..8]);
        if actual != prelude_crc {
            return Err(EventStreamError::PreludeChecksum {
                expected: prelude_crc,
                actual,
            });
        }
        if !(MIN_MESSAGE_LEN..=MAX_MESSAGE_LEN).contains(&total_len)
            || headers_len > total_len - MIN_MESSAGE_LEN
        {
            return Err(EventStreamError::InvalidLength(total_len));
        }

        if src.len() < total_len {
            src.reserve(total_len - src.len());
            return Ok(None);
        }

        let message = src.split_to(total_len).freeze();
        let crc_offset = total_len - CRC_LEN;
        let message_crc = u32::from_be_bytes([
            message[crc_offset],
            message[crc_offset + 1],
            message[crc_offset + 2],
            message[crc_offset + 3],
        ]);
        let actual = crc32fast::hash(&message[..crc_offset]);
        if actual != message_crc {
            return Err(EventStreamError::MessageChecksum {
                expected: message_crc,
                actual,
            });
        }

        let headers_end = PRELUDE_LEN + headers_len;
        let headers = read_headers(&message[PRELUDE_LEN..headers_end])?;
        let payload = message.slice(headers_end..crc_offset);

        Ok(Some(Frame { headers, payload }))
    }
}

impl Encoder<Frame> for EventStreamCodec {
    type Error = EventStreamError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), EventStreamError> {
        let mut headers = BytesMut::new();
        for header in &frame.headers {
            write_header(header, &mut headers)?;
        }

        let total_len = MIN_MESSAGE_LEN + headers.len() + frame.payload.len();
        if total_len > MAX_MESSAGE_LEN {
            return Err(EventStreamError::InvalidLength(total_len));
        }

        let mut message = BytesMut::with_capacity(total_len);
        message.put_u32(total_len as u32);
        message.put_u32(headers.len() as u32);
        let prelude_crc = crc32fast::hash(&message[..8]);
        message.put_u32(prelude_crc);
        message.put_slice(&headers);
        message.put_slice(&frame.payload);
        let message_crc = crc32fast::hash(&message);
        message.put_u32(message_crc);

        dst.extend_from_slice(&message);
        Ok(())
    }
}

fn ensure(buf: &[u8], needed: usize, what: &str) -> Result<(), EventStreamError> {
    if buf.remaining() < needed {
        return Err(EventStreamError::InvalidHeader(format!("truncated {}", what)));
    }
    Ok(())
}

fn read_sized<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], EventStreamError> {
    ensure(*buf, 2, "value length")?;
    let len = buf.get_u16() as usize;
    let slice: &'a [u8] = *buf;
    ensure(slice, len, "value")?;
    let (value, rest) = slice.split_at(len);
    *buf = rest;
    Ok(value)
}

fn read_headers(mut buf: &[u8]) -> Result<Vec<Header>, EventStreamError> {
    let mut headers = Vec::new();

    while buf.has_remaining() {
        let name_len = buf.get_u8() as usize;
        ensure(buf, name_len, "header name")?;
        let name = std::str::from_utf8(&buf[..name_len])
            .map_err(|e| EventStreamError::InvalidHeader(e.to_string()))?
            .to_string();
        buf.advance(name_len);

        ensure(buf, 1, "header type")?;
        let value = match buf.get_u8() {
            0 => HeaderValue::Bool(true),
            1 => HeaderValue::Bool(false),
            2 => {
                ensure(buf, 1, "byte value")?;
                HeaderValue::Byte(buf.get_i8())
            }
            3 => {
                ensure(buf, 2, "int16 value")?;
                HeaderValue::Int16(buf.get_i16())
            }
            4 => {
                ensure(buf, 4, "int32 value")?;
                HeaderValue::Int32(buf.get_i32())
            }
            5 => {
                ensure(buf, 8, "int64 value")?;
                HeaderValue::Int64(buf.get_i64())
            }
            6 => HeaderValue::ByteArray(Bytes::copy_from_slice(read_sized(&mut buf)?)),
            7 => {
                let value = std::str::from_utf8(read_sized(&mut buf)?)
                    .map_err(|e| EventStreamError::InvalidHeader(e.to_string()))?;
                HeaderValue::String(value.to_string())
            }
            8 => {
                ensure(buf, 8, "timestamp value")?;
                HeaderValue::Timestamp(buf.get_i64())
            }
            9 => {
                ensure(buf, 16, "uuid value")?;
                let mut uuid = [0u8; 16];
                buf.copy_to_slice(&mut uuid);
                HeaderValue::Uuid(uuid)
            }
            other => {
                return Err(EventStreamError::InvalidHeader(format!(
                    "unknown value type {}",
                    other
                )))
            }
        };

        headers.push(Header { name, value });
    }

    Ok(headers)
}

fn write_header(header: &Header, dst: &mut BytesMut) -> Result<(), EventStreamError> {
    let name = header.name.as_bytes();
    if name.is_empty() || name.len() > u8::MAX as usize {
        return Err(EventStreamError::InvalidHeader(format!(
            "header name length {}",
            name.len()
        )));
    }
    dst.put_u8(name.len() as u8);
    dst.put_slice(name);
    dst.put_u8(header.value.type_id());

    match &header.value {
        HeaderValue::Bool(_) => {}
        HeaderValue::Byte(v) => dst.put_i8(*v),
        HeaderValue::Int16(v) => dst.put_i16(*v),
        HeaderValue::Int32(v) => dst.put_i32(*v),
        HeaderValue::Int64(v) | HeaderValue::Timestamp(v) => dst.put_i64(*v),
        HeaderValue::ByteArray(bytes) => put_sized(dst, bytes)?,
        HeaderValue::String(s) => put_sized(dst, s.as_bytes())?,
        HeaderValue::Uuid(uuid) => dst.put_slice(uuid),
    }
    Ok(())
}

fn put_sized(dst: &mut BytesMut, bytes: &[u8]) -> Result<(), EventStreamError> {
    let len = u16::try_from(bytes.len())
        .map_err(|_| EventStreamError::InvalidHeader(format!("value length {}", bytes.len())))?;
    dst.put_u16(len);
    dst.put_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_frame(payload: &str) -> Frame {
        Frame::new(
            vec![
                Header::string(":message-type", "event"),
                Header::string(":event-type", "chunk"),
                Header::string(":content-type", "application/json"),
            ],
            Bytes::copy_from_slice(payload.as_bytes()),
        )
    }

    fn encode(frame: Frame) -> BytesMut {
        let mut buf = BytesMut::new();
        EventStreamCodec.encode(frame, &mut buf).unwrap();
        buf
    }

    #[test]
    fn decodes_what_it_encodes() {
        let frame = Frame::new(
            vec![
                Header::string(":event-type", "chunk"),
                Header {
                    name: "flag".to_string(),
                    value: HeaderValue::Bool(false),
                },
                Header {
                    name: "count".to_string(),
                    value: HeaderValue::Int32(-7),
                },
                Header {
                    name: "id".to_string(),
                    value: HeaderValue::Uuid([7; 16]),
                },
            ],
            Bytes::from_static(b"{\"bytes\":\"aGk=\"}"),
        );

        let mut buf = encode(frame.clone());
        let decoded = EventStreamCodec.decode(&mut buf).unwrap();

        assert_eq!(decoded, Some(frame));
        assert!(buf.is_empty());
    }

    #[test]
    fn waits_for_a_complete_message() {
        let full = encode(chunk_frame("{}"));
        let mut codec = EventStreamCodec::new();

        let mut partial = BytesMut::from(&full[..5]);
        assert_eq!(codec.decode(&mut partial).unwrap(), None);

        let mut partial = BytesMut::from(&full[..full.len() - 1]);
        assert_eq!(codec.decode(&mut partial).unwrap(), None);
        assert_eq!(partial.len(), full.len() - 1);
    }

    #[test]
    fn decodes_back_to_back_messages() {
        let mut buf = encode(chunk_frame("one"));
        buf.extend_from_slice(&encode(chunk_frame("two")));

        let first = EventStreamCodec.decode(&mut buf).unwrap().unwrap();
        let second = EventStreamCodec.decode(&mut buf).unwrap().unwrap();

        assert_eq!(first.payload, Bytes::from_static(b"one"));
        assert_eq!(second.payload, Bytes::from_static(b"two"));
        assert_eq!(second.header_str(":event-type"), Some("chunk"));
        assert_eq!(EventStreamCodec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn rejects_corrupted_payload() {
        let mut buf = encode(chunk_frame("payload"));
        let index = buf.len() - 6;
        buf[index] ^= 0xff;

        let err = EventStreamCodec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, EventStreamError::MessageChecksum { .. }));
    }

    #[test]
    fn rejects_corrupted_prelude() {
        let mut buf = encode(chunk_frame("payload"));
        buf[3] ^= 0x01;

        let err = EventStreamCodec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, EventStreamError::PreludeChecksum { .. }));
    }

    #[test]
    fn header_lookup_ignores_non_string_values() {
        let frame = Frame::new(
            vec![Header {
                name: ":event-type".to_string(),
                value: HeaderValue::Int16(1),
            }],
            Bytes::new(),
        );
        assert_eq!(frame.header_str(":event-type"), None);
        assert_eq!(frame.header_str(":missing"), None);
    }
}
