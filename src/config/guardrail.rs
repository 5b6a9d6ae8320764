//! Guardrail configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Content-safety check settings. Without an `id` the check is disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardrailConfig {
    /// Guardrail identifier
    pub id: Option<String>,

    /// Guardrail version
    #[serde(default = "default_version")]
    pub version: String,

    /// Screen user input before calling the agent
    #[serde(default = "default_true")]
    pub check_input: bool,

    /// Screen agent output before replying
    #[serde(default = "default_true")]
    pub check_output: bool,

    /// Upper bound on one guardrail call, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GuardrailConfig {
    /// The configured identifier, if the check is enabled.
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate guardrail configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.identifier().is_some() && self.version.trim().is_empty() {
            return Err(ValidationError::MissingRequired("guardrail.version"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("guardrail.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            id: None,
            version: default_version(),
            check_input: true,
            check_output: true,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_version() -> String {
    "DRAFT".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_the_check() {
        let config = GuardrailConfig::default();
        assert!(config.identifier().is_none());
        assert_eq!(config.version, "DRAFT");
        assert!(config.check_input && config.check_output);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn blank_id_counts_as_disabled() {
        let config = GuardrailConfig {
            id: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.identifier().is_none());
    }

    #[test]
    fn timeout_bounds_are_enforced() {
        let config = GuardrailConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("guardrail.timeout_secs"))
        );
    }
}
