//! Relay message handler.
//!
//! Runs one inbound chat message through the relay pipeline:
//!
//! ```text
//! content ─► input guardrail ─► agent ─► normalize ─► output guardrail ─► reply
//! ```
//!
//! Every failure is reported as a [`RelayError`] carrying a closed
//! [`ErrorKind`]; nothing here is fatal to the connection.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::application::safety_filter::{FilterOutcome, SafetyFilter};
use crate::domain::relay::{normalize, NormalizeError};
use crate::ports::{AgentError, AgentRuntime, AgentTarget, GuardrailSource, InvokeAgentRequest};

/// Closed classification of relay failures, exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The inbound frame could not be parsed.
    InvalidFrame,
    /// The agent call failed.
    AgentFailure,
    /// The agent call exceeded its time bound.
    AgentTimeout,
    /// The agent's payload was not valid text.
    DecodeFailure,
    /// The agent replied in a shape the relay does not understand.
    UnexpectedResponse,
}

/// A failed relay of one message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RelayError {
    pub kind: ErrorKind,
    pub message: String,
}

impl RelayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<AgentError> for RelayError {
    fn from(err: AgentError) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::AgentTimeout
        } else {
            ErrorKind::AgentFailure
        };
        Self::new(kind, err.to_string())
    }
}

impl From<NormalizeError> for RelayError {
    fn from(err: NormalizeError) -> Self {
        let kind = match err {
            NormalizeError::Decode(_) => ErrorKind::DecodeFailure,
            NormalizeError::UnexpectedFormat { .. } | NormalizeError::Unprocessable => {
                ErrorKind::UnexpectedResponse
            }
        };
        Self::new(kind, err.to_string())
    }
}

/// Command to relay one user message.
#[derive(Debug, Clone)]
pub struct RelayMessageCommand {
    /// The user's message.
    pub content: String,
}

impl RelayMessageCommand {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Successful outcome of relaying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Completion text to deliver.
    Delivered(String),
    /// The user's message was blocked; the agent was not called.
    InputSuppressed,
    /// The agent's completion was blocked.
    OutputSuppressed,
}

impl RelayOutcome {
    /// The text to send to the client, `None` when content was suppressed.
    pub fn into_response(self) -> Option<String> {
        match self {
            Self::Delivered(text) => Some(text),
            Self::InputSuppressed | Self::OutputSuppressed => None,
        }
    }
}

/// Configuration for the relay handler.
#[derive(Debug, Clone)]
pub struct RelayHandlerConfig {
    /// Ask the agent for trace events.
    pub enable_trace: bool,
    /// Upper bound on a single agent call.
    pub agent_timeout: Duration,
    /// Deliver unrecognized or missing completions as legacy sentinel text
    /// instead of reporting them as errors.
    pub legacy_sentinels: bool,
}

impl Default for RelayHandlerConfig {
    fn default() -> Self {
        Self {
            enable_trace: true,
            agent_timeout: Duration::from_secs(120),
            legacy_sentinels: false,
        }
    }
}

/// Relays user messages to the configured agent.
pub struct RelayMessageHandler {
    agent: Arc<dyn AgentRuntime>,
    filter: SafetyFilter,
    target: AgentTarget,
    config: RelayHandlerConfig,
}

impl RelayMessageHandler {
    pub fn new(
        agent: Arc<dyn AgentRuntime>,
        filter: SafetyFilter,
        target: AgentTarget,
        config: RelayHandlerConfig,
    ) -> Self {
        Self {
            agent,
            filter,
            target,
            config,
        }
    }

    /// Relays one message and returns what should be sent back.
    pub async fn handle(&self, command: RelayMessageCommand) -> Result<RelayOutcome, RelayError> {
        let input_text = match self.filter.check(&command.content, GuardrailSource::Input).await {
            FilterOutcome::Text(text) => text,
            FilterOutcome::Suppressed => return Ok(RelayOutcome::InputSuppressed),
        };

        let request =
            InvokeAgentRequest::new(self.target.clone(), input_text).with_trace(self.config.enable_trace);
        let response = tokio::time::timeout(self.config.agent_timeout, self.agent.invoke(request))
            .await
            .map_err(|_| AgentError::Timeout {
                timeout_secs: self.config.agent_timeout.as_secs(),
            })??;

        tracing::debug!(shape = response.shape(), "Agent replied");

        let completion = match normalize(&response) {
            Ok(text) => text,
            Err(e) => match e.legacy_sentinel() {
                Some(sentinel) if self.config.legacy_sentinels => {
                    tracing::warn!("Delivering legacy sentinel for agent reply: {:?}", e);
                    return Ok(RelayOutcome::Delivered(sentinel.to_string()));
                }
                _ => return Err(e.into()),
            },
        };

        if completion.is_empty() {
            tracing::warn!("Agent returned an empty completion");
        }

        match self.filter.check(&completion, GuardrailSource::Output).await {
            FilterOutcome::Text(text) => Ok(RelayOutcome::Delivered(text)),
            FilterOutcome::Suppressed => Ok(RelayOutcome::OutputSuppressed),
        }
    }
}
