//! Application layer - Handlers and services.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod safety_filter;

pub use handlers::{
    ErrorKind, RelayError, RelayHandlerConfig, RelayMessageCommand, RelayMessageHandler,
    RelayOutcome,
};
pub use safety_filter::{FilterOutcome, FilterStages, SafetyFilter};
