//! Mock adapters.
//!
//! Configurable in-process implementations of the agent and guardrail ports,
//! used by unit and integration tests to run without AWS access.

mod agent_runtime;
mod guardrail;

pub use agent_runtime::MockAgentRuntime;
pub use guardrail::MockGuardrail;
