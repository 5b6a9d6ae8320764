//! AWS Bedrock adapters.
//!
//! Implementations of the agent and guardrail ports against the Bedrock HTTP
//! APIs, without the AWS SDK:
//!
//! - `signing` - SigV4 request signing
//! - `event_stream` - `application/vnd.amazon.eventstream` frame codec
//! - `agent_runtime` - `InvokeAgent` on the agent runtime endpoint
//! - `guardrail` - `ApplyGuardrail` on the runtime endpoint

pub mod agent_runtime;
pub mod event_stream;
pub mod guardrail;
pub mod signing;

pub use agent_runtime::BedrockAgentRuntime;
pub use event_stream::{EventStreamCodec, EventStreamError, Frame, Header, HeaderValue};
pub use guardrail::BedrockGuardrail;
pub use signing::{AwsCredentials, SigV4Signer, SignableRequest};

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

/// SigV4 signing name shared by the Bedrock endpoints.
pub const SIGNING_SERVICE: &str = "bedrock";

/// Connection settings shared by the Bedrock clients.
#[derive(Debug, Clone)]
pub struct BedrockClientConfig {
    pub region: String,
    pub credentials: Arc<AwsCredentials>,
    /// Base URL; `None` selects the public regional endpoint.
    pub endpoint: Option<String>,
    pub connect_timeout: Duration,
}

impl BedrockClientConfig {
    pub fn new(region: impl Into<String>, credentials: Arc<AwsCredentials>) -> Self {
        Self {
            region: region.into(),
            credentials,
            endpoint: None,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Overrides the endpoint base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Resolves the base URL, falling back to `https://{prefix}.{region}.amazonaws.com`.
    fn base_url(&self, prefix: &str) -> Result<Url, InvalidEndpoint> {
        let raw = self
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.{}.amazonaws.com", prefix, self.region));
        Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| InvalidEndpoint(format!("{}: {}", raw, e)))
    }

    fn signer(&self) -> SigV4Signer {
        SigV4Signer::new(self.credentials.clone(), self.region.clone(), SIGNING_SERVICE)
    }
}

/// The configured endpoint is not a valid URL.
#[derive(Debug, thiserror::Error)]
#[error("invalid endpoint {0}")]
pub struct InvalidEndpoint(pub String);

/// `host[:port]` of a URL as sent in the `Host` header.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
