//! Bedrock agent runtime - implementation of AgentRuntime via `InvokeAgent`.
//!
//! # Protocol
//!
//! ```text
//! POST /agents/{agentId}/agentAliases/{agentAliasId}/sessions/{sessionId}/text
//! { "inputText": "...", "enableTrace": true }
//! ```
//!
//! The reply body is an event stream. `chunk` events carry
//! `{"bytes": "<base64>"}` fragments of the completion; `trace` events are
//! logged and otherwise ignored; `exception` and `error` messages fail the call.

use async_trait::async_trait;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

use super::event_stream::{EventStreamCodec, Frame};
use super::signing::{uri_encode, SigV4Signer, SignableRequest};
use super::{host_header, BedrockClientConfig};
use crate::domain::relay::{AgentResponse, PayloadPart, StreamEvent};
use crate::ports::{AgentError, AgentRuntime, InvokeAgentRequest};

const ENDPOINT_PREFIX: &str = "bedrock-agent-runtime";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeAgentBody<'a> {
    input_text: &'a str,
    enable_trace: bool,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Bedrock `InvokeAgent` client.
#[derive(Debug)]
pub struct BedrockAgentRuntime {
    client: Client,
    base_url: Url,
    signer: SigV4Signer,
}

impl BedrockAgentRuntime {
    /// Creates a client for the configured region or endpoint.
    pub fn new(config: &BedrockClientConfig) -> Result<Self, AgentError> {
        let base_url = config
            .base_url(ENDPOINT_PREFIX)
            .map_err(|e| AgentError::network(e.to_string()))?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AgentError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            signer: config.signer(),
        })
    }

    fn invoke_path(&self, request: &InvokeAgentRequest) -> String {
        format!(
            "{}/agents/{}/agentAliases/{}/sessions/{}/text",
            self.base_url.path().trim_end_matches('/'),
            uri_encode(&request.target.agent_id),
            uri_encode(&request.target.agent_alias_id),
            uri_encode(&request.target.session_id),
        )
    }

    async fn send(&self, request: &InvokeAgentRequest) -> Result<Response, AgentError> {
        let path = self.invoke_path(request);
        let body = serde_json::to_vec(&InvokeAgentBody {
            input_text: &request.input_text,
            enable_trace: request.enable_trace,
        })
        .map_err(|e| AgentError::network(format!("Failed to encode request: {}", e)))?;

        let host = host_header(&self.base_url);
        let signed = self.signer.sign(
            &SignableRequest {
                method: "POST",
                host: &host,
                path: &path,
                query: "",
                headers: &[("content-type", "application/json")],
                payload: &body,
            },
            Utc::now(),
        );

        let mut url = self.base_url.clone();
        url.set_path(&path);

        let mut builder = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .header("accept", "application/vnd.amazon.eventstream");
        for (name, value) in signed {
            builder = builder.header(name, value);
        }

        builder.body(body).send().await.map_err(|e| {
            if e.is_connect() {
                AgentError::network(format!("Connection failed: {}", e))
            } else {
                AgentError::network(e.to_string())
            }
        })
    }

    /// Maps a non-success status to an error.
    async fn handle_response_status(response: Response) -> Result<Response, AgentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(':').next().unwrap_or(v).to_string())
            .unwrap_or_else(|| status.as_u16().to_string());
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServiceErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);

        match status.as_u16() {
            401 | 403 => Err(AgentError::AuthenticationFailed(message)),
            _ => Err(AgentError::service(code, message)),
        }
    }
}

/// Converts one event-stream message into a stream event.
fn event_from_frame(frame: &Frame) -> Result<StreamEvent, AgentError> {
    match frame.header_str(":message-type").unwrap_or("event") {
        "event" => match frame.header_str(":event-type") {
            Some("chunk") => {
                let part: PayloadPart = serde_json::from_slice(&frame.payload)
                    .map_err(|e| AgentError::invalid_response(format!("bad chunk payload: {}", e)))?;
                Ok(StreamEvent { chunk: Some(part) })
            }
            Some("trace") => {
                tracing::debug!(
                    trace = %String::from_utf8_lossy(&frame.payload),
                    "Agent trace event"
                );
                Ok(StreamEvent::empty())
            }
            other => {
                tracing::debug!(event_type = ?other, "Ignoring agent event");
                Ok(StreamEvent::empty())
            }
        },
        "exception" => {
            let code = frame.header_str(":exception-type").unwrap_or("exception");
            let message = serde_json::from_slice::<ServiceErrorBody>(&frame.payload)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&frame.payload).into_owned());
            Err(AgentError::service(code, message))
        }
        "error" => Err(AgentError::service(
            frame.header_str(":error-code").unwrap_or("error"),
            frame.header_str(":error-message").unwrap_or_default(),
        )),
        other => Err(AgentError::invalid_response(format!(
            "unknown message type {}",
            other
        ))),
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    async fn invoke(&self, request: InvokeAgentRequest) -> Result<AgentResponse, AgentError> {
        let response = self.send(&request).await?;
        let response = Self::handle_response_status(response).await?;

        let body = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let frames = FramedRead::new(StreamReader::new(body), EventStreamCodec::new());
        futures::pin_mut!(frames);

        let mut events = Vec::new();
        while let Some(frame) = frames.next().await {
            let frame = frame.map_err(|e| AgentError::invalid_response(e.to_string()))?;
            events.push(event_from_frame(&frame)?);
        }

        tracing::debug!(
            session_id = %request.target.session_id,
            events = events.len(),
            "Agent stream complete"
        );

        Ok(AgentResponse::StreamingCompletion(events))
    }
}
