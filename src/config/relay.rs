//! Relay behaviour configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Per-message relay settings
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Upper bound on one agent call, in seconds
    #[serde(default = "default_agent_timeout")]
    pub agent_timeout_secs: u64,

    /// Send unrecognized agent replies as legacy sentinel text
    #[serde(default)]
    pub legacy_sentinels: bool,
}

impl RelayConfig {
    /// Get agent timeout as Duration
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }

    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.agent_timeout_secs == 0 || self.agent_timeout_secs > 900 {
            return Err(ValidationError::InvalidTimeout("relay.agent_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            agent_timeout_secs: default_agent_timeout(),
            legacy_sentinels: false,
        }
    }
}

fn default_agent_timeout() -> u64 {
    120
}
