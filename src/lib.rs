//! Bedrock Relay - WebSocket chat relay in front of an AWS Bedrock agent
//!
//! Each client message is optionally screened by a guardrail, forwarded to the
//! agent, normalized from whichever reply shape the agent used into plain text,
//! screened again, and sent back over the same connection.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
