//! Mock agent runtime for testing.
//!
//! Returns pre-configured replies in order, falling back to a default text
//! completion once the queue is exhausted.
//!
//! # Example
//!
//! ```ignore
//! let agent = MockAgentRuntime::new()
//!     .with_text("Hi there")
//!     .with_error(AgentError::network("timeout"));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::relay::AgentResponse;
use crate::ports::{AgentError, AgentRuntime, InvokeAgentRequest};

/// Mock agent runtime.
#[derive(Debug, Clone, Default)]
pub struct MockAgentRuntime {
    /// Pre-configured replies (consumed in order).
    responses: Arc<Mutex<VecDeque<Result<AgentResponse, AgentError>>>>,
    /// Simulated latency per call.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<InvokeAgentRequest>>>,
}

impl MockAgentRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply of the given shape.
    pub fn with_response(self, response: AgentResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queues a plain text completion.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(AgentResponse::TextCompletion(text.into()))
    }

    /// Queues a reply decoded from its JSON form.
    pub fn with_json(self, value: serde_json::Value) -> Self {
        self.with_response(AgentResponse::from_json(&value))
    }

    /// Queues an error.
    pub fn with_error(self, error: AgentError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<InvokeAgentRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<AgentResponse, AgentError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AgentResponse::TextCompletion("Mock response".to_string())))
    }
}

#[async_trait]
impl AgentRuntime for MockAgentRuntime {
    async fn invoke(&self, request: InvokeAgentRequest) -> Result<AgentResponse, AgentError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.next_response()
    }
}
