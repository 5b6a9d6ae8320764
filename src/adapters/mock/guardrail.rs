//! Mock guardrail for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{Guardrail, GuardrailAssessment, GuardrailError, GuardrailRequest};

/// Mock guardrail.
///
/// Assessments are consumed in order; once exhausted every check passes.
#[derive(Debug, Clone, Default)]
pub struct MockGuardrail {
    assessments: Arc<Mutex<VecDeque<Result<GuardrailAssessment, GuardrailError>>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GuardrailRequest>>>,
}

impl MockGuardrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an assessment.
    pub fn with_assessment(self, assessment: GuardrailAssessment) -> Self {
        self.assessments.lock().unwrap().push_back(Ok(assessment));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: GuardrailError) -> Self {
        self.assessments.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets simulated latency per check.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<GuardrailRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Guardrail for MockGuardrail {
    async fn apply(&self, request: GuardrailRequest) -> Result<GuardrailAssessment, GuardrailError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.assessments
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GuardrailAssessment::pass()))
    }
}
