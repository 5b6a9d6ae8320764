//! Bedrock agent configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Which agent alias and session to talk to
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub session_id: String,

    /// Ask the agent to emit trace events
    #[serde(default = "default_enable_trace")]
    pub enable_trace: bool,
}

impl AgentConfig {
    /// Validate agent configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.agent_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("agent.agent_id"));
        }
        if self.agent_alias_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("agent.agent_alias_id"));
        }
        if self.session_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("agent.session_id"));
        }
        Ok(())
    }
}

fn default_enable_trace() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_fail_validation() {
        let config = AgentConfig {
            agent_id: "AGENT".to_string(),
            agent_alias_id: "".to_string(),
            session_id: "s".to_string(),
            enable_trace: true,
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("agent.agent_alias_id"))
        );
    }
}
