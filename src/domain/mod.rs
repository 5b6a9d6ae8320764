//! Domain layer containing the relay's pure logic and types.
//!
//! # Module Organization
//!
//! - `relay` - Agent response shapes, stream decoding and completion normalization

pub mod relay;
