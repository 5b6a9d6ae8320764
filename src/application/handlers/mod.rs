//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod relay_message;

pub use relay_message::{
    ErrorKind, RelayError, RelayHandlerConfig, RelayMessageCommand, RelayMessageHandler,
    RelayOutcome,
};
