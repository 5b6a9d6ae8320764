//! Safety filter - best-effort guardrail stage of the relay pipeline.
//!
//! The filter never fails a request. When no guardrail is configured it is a
//! no-op; when the guardrail cannot be reached or its answer cannot be read,
//! the original text is returned unchanged.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{Guardrail, GuardrailError, GuardrailRequest, GuardrailSettings, GuardrailSource};

/// Result of passing text through the safety filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Text to deliver (original or rewritten).
    Text(String),
    /// Content was blocked; there is nothing to deliver.
    Suppressed,
}

impl FilterOutcome {
    /// Converts into the deliverable text, `None` when suppressed.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Suppressed => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

/// Which stages of the conversation are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterStages {
    pub input: bool,
    pub output: bool,
}

impl Default for FilterStages {
    fn default() -> Self {
        Self {
            input: true,
            output: true,
        }
    }
}

impl FilterStages {
    fn includes(&self, source: GuardrailSource) -> bool {
        match source {
            GuardrailSource::Input => self.input,
            GuardrailSource::Output => self.output,
        }
    }
}

/// Applies the configured guardrail to user input and agent output.
#[derive(Clone)]
pub struct SafetyFilter {
    guardrail: Arc<dyn Guardrail>,
    settings: Option<GuardrailSettings>,
    stages: FilterStages,
    timeout: Duration,
}

impl SafetyFilter {
    /// Creates a filter. `settings == None` disables filtering entirely.
    pub fn new(guardrail: Arc<dyn Guardrail>, settings: Option<GuardrailSettings>) -> Self {
        Self {
            guardrail,
            settings,
            stages: FilterStages::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Restricts which stages are checked.
    pub fn with_stages(mut self, stages: FilterStages) -> Self {
        self.stages = stages;
        self
    }

    /// Bounds each guardrail call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if a guardrail is configured.
    pub fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    /// Checks `text` coming from `source`.
    pub async fn check(&self, text: &str, source: GuardrailSource) -> FilterOutcome {
        let Some(settings) = self.settings.as_ref() else {
            return FilterOutcome::Text(text.to_string());
        };
        if text.is_empty() || !self.stages.includes(source) {
            return FilterOutcome::Text(text.to_string());
        }

        let request = GuardrailRequest {
            settings: settings.clone(),
            source,
            text: text.to_string(),
        };

        let result = match tokio::time::timeout(self.timeout, self.guardrail.apply(request)).await {
            Ok(result) => result,
            Err(_) => Err(GuardrailError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        };

        match result {
            Ok(assessment) if assessment.blocked => {
                tracing::info!(
                    guardrail_id = %settings.identifier,
                    source = source.as_str(),
                    "Guardrail blocked content"
                );
                FilterOutcome::Suppressed
            }
            Ok(assessment) => {
                tracing::debug!(
                    guardrail_id = %settings.identifier,
                    source = source.as_str(),
                    rewritten = assessment.output_text.is_some(),
                    "Guardrail applied"
                );
                FilterOutcome::Text(assessment.output_text.unwrap_or_else(|| text.to_string()))
            }
            Err(e) => {
                tracing::warn!(
                    guardrail_id = %settings.identifier,
                    source = source.as_str(),
                    "Error applying guardrail, passing text through: {}",
                    e
                );
                FilterOutcome::Text(text.to_string())
            }
        }
    }
}

impl std::fmt::Debug for SafetyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyFilter")
            .field("settings", &self.settings)
            .field("stages", &self.stages)
            .field("timeout", &self.timeout)
            .finish()
    }
}
