//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AgentRuntime` - Invokes a hosted conversational agent
//! - `Guardrail` - Content-safety check applied to user input and agent output

mod agent_runtime;
mod guardrail;

pub use agent_runtime::{AgentError, AgentRuntime, AgentTarget, InvokeAgentRequest};
pub use guardrail::{
    Guardrail, GuardrailAssessment, GuardrailError, GuardrailRequest, GuardrailSettings,
    GuardrailSource,
};
