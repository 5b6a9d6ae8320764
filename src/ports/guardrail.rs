//! Guardrail Port - Interface for the external content-safety check.
//!
//! A guardrail inspects a piece of text and either lets it through (possibly
//! rewritten, e.g. with sensitive data masked) or blocks it.

use async_trait::async_trait;
use serde::Serialize;

/// Port for content-safety checks.
#[async_trait]
pub trait Guardrail: Send + Sync {
    /// Submits text to the safety check.
    async fn apply(&self, request: GuardrailRequest) -> Result<GuardrailAssessment, GuardrailError>;
}

/// Which side of the conversation the text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuardrailSource {
    /// Raw user input, checked before it reaches the agent.
    Input,
    /// Agent completion, checked before it reaches the user.
    Output,
}

impl GuardrailSource {
    /// Wire name of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
        }
    }
}

/// Which guardrail to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailSettings {
    /// Guardrail identifier.
    pub identifier: String,
    /// Guardrail version (a number or `DRAFT`).
    pub version: String,
}

impl GuardrailSettings {
    /// Creates new guardrail settings.
    pub fn new(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.into(),
        }
    }
}

/// A single safety check.
#[derive(Debug, Clone)]
pub struct GuardrailRequest {
    pub settings: GuardrailSettings,
    pub source: GuardrailSource,
    pub text: String,
}

/// Result of a safety check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardrailAssessment {
    /// The content was blocked.
    pub blocked: bool,
    /// Replacement text, if the guardrail rewrote the content.
    pub output_text: Option<String>,
}

impl GuardrailAssessment {
    /// Content passed unchanged.
    pub fn pass() -> Self {
        Self::default()
    }

    /// Content passed with rewritten text.
    pub fn rewritten(text: impl Into<String>) -> Self {
        Self {
            blocked: false,
            output_text: Some(text.into()),
        }
    }

    /// Content was blocked.
    pub fn blocked() -> Self {
        Self {
            blocked: true,
            output_text: None,
        }
    }
}

/// Guardrail errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardrailError {
    #[error("network error: {0}")]
    Network(String),

    #[error("guardrail check timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("guardrail service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("malformed guardrail response: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&GuardrailSource::Input).unwrap(), "\"INPUT\"");
        assert_eq!(serde_json::to_string(&GuardrailSource::Output).unwrap(), "\"OUTPUT\"");
        assert_eq!(GuardrailSource::Output.as_str(), "OUTPUT");
    }

    #[test]
    fn assessment_constructors_work() {
        assert!(!GuardrailAssessment::pass().blocked);
        assert_eq!(
            GuardrailAssessment::rewritten("masked").output_text,
            Some("masked".to_string())
        );
        assert!(GuardrailAssessment::blocked().blocked);
    }
}
