//! Agent Runtime Port - Interface for invoking the hosted conversational agent.
//!
//! The relay forwards each user message to an agent that is configured once at
//! process start (agent, alias and session identifiers). Implementations return
//! the reply already decoded into an [`AgentResponse`] shape.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoAgent;
//!
//! #[async_trait]
//! impl AgentRuntime for EchoAgent {
//!     async fn invoke(&self, request: InvokeAgentRequest) -> Result<AgentResponse, AgentError> {
//!         Ok(AgentResponse::TextCompletion(request.input_text))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::relay::AgentResponse;

/// Port for agent invocations.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Sends one user message to the agent and returns its reply.
    async fn invoke(&self, request: InvokeAgentRequest) -> Result<AgentResponse, AgentError>;
}

/// Identifiers of the agent conversation, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTarget {
    /// Agent identifier.
    pub agent_id: String,
    /// Agent alias identifier.
    pub agent_alias_id: String,
    /// Conversation session identifier.
    pub session_id: String,
}

impl AgentTarget {
    /// Creates a new agent target.
    pub fn new(
        agent_id: impl Into<String>,
        agent_alias_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_alias_id: agent_alias_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// A single agent invocation.
#[derive(Debug, Clone)]
pub struct InvokeAgentRequest {
    /// Which agent conversation to address.
    pub target: AgentTarget,
    /// The user's message.
    pub input_text: String,
    /// Ask the service to interleave trace events with the completion.
    pub enable_trace: bool,
}

impl InvokeAgentRequest {
    /// Creates a new invocation for the given target.
    pub fn new(target: AgentTarget, input_text: impl Into<String>) -> Self {
        Self {
            target,
            input_text: input_text.into(),
            enable_trace: false,
        }
    }

    /// Sets trace reporting.
    pub fn with_trace(mut self, enable_trace: bool) -> Self {
        self.enable_trace = enable_trace;
        self
    }
}

/// Agent invocation errors.
///
/// Display strings are forwarded to the client verbatim, so they stay short
/// and free of internal detail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// Could not reach the service.
    #[error("{0}")]
    Network(String),

    /// The call did not complete within the configured bound.
    #[error("agent call timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The service answered with an error or exception.
    #[error("{code}: {message}")]
    Service {
        /// Service error code or exception type.
        code: String,
        /// Error details.
        message: String,
    },

    /// The reply could not be read.
    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
}

impl AgentError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a service error.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Returns true if the call was abandoned because of the timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
