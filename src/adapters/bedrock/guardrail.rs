//! Bedrock guardrail - implementation of Guardrail via `ApplyGuardrail`.
//!
//! ```text
//! POST /guardrail/{guardrailIdentifier}/version/{guardrailVersion}/apply
//! { "source": "INPUT", "content": [ { "text": { "text": "..." } } ] }
//! ```
//!
//! A reply with `action: GUARDRAIL_INTERVENED` either blocks the content (some
//! policy assessment carries `action: BLOCKED`) or rewrites it, in which case
//! the replacement text is the concatenation of `outputs[].text`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::signing::{uri_encode, SigV4Signer, SignableRequest};
use super::{host_header, BedrockClientConfig};
use crate::ports::{
    Guardrail, GuardrailAssessment, GuardrailError, GuardrailRequest, GuardrailSource,
};

const ENDPOINT_PREFIX: &str = "bedrock-runtime";
const INTERVENED: &str = "GUARDRAIL_INTERVENED";
const BLOCKED: &str = "BLOCKED";

#[derive(Debug, Serialize)]
struct ApplyGuardrailBody<'a> {
    source: GuardrailSource,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
struct ContentBlock<'a> {
    text: TextBlock<'a>,
}

#[derive(Debug, Serialize)]
struct TextBlock<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApplyGuardrailResponse {
    #[serde(default)]
    action: String,
    #[serde(default)]
    outputs: Vec<GuardrailOutput>,
    #[serde(default)]
    assessments: Vec<Value>,
    #[serde(default)]
    usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GuardrailOutput {
    #[serde(default)]
    text: String,
}

impl ApplyGuardrailResponse {
    fn into_assessment(self) -> GuardrailAssessment {
        if self.action != INTERVENED {
            return GuardrailAssessment::pass();
        }
        if self.assessments.iter().any(contains_blocked_action) {
            return GuardrailAssessment::blocked();
        }
        if self.outputs.is_empty() {
            return GuardrailAssessment::pass();
        }
        let text: String = self.outputs.into_iter().map(|o| o.text).collect();
        GuardrailAssessment::rewritten(text)
    }
}

/// Walks an assessment looking for any `"action": "BLOCKED"` entry.
fn contains_blocked_action(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.iter().any(|(key, v)| {
            (key == "action" && v.as_str() == Some(BLOCKED)) || contains_blocked_action(v)
        }),
        Value::Array(items) => items.iter().any(contains_blocked_action),
        _ => false,
    }
}

/// Bedrock `ApplyGuardrail` client.
#[derive(Debug)]
pub struct BedrockGuardrail {
    client: Client,
    base_url: Url,
    signer: SigV4Signer,
}

impl BedrockGuardrail {
    /// Creates a client for the configured region or endpoint.
    pub fn new(config: &BedrockClientConfig) -> Result<Self, GuardrailError> {
        let base_url = config
            .base_url(ENDPOINT_PREFIX)
            .map_err(|e| GuardrailError::Network(e.to_string()))?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GuardrailError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            signer: config.signer(),
        })
    }

    async fn handle_response_status(response: Response) -> Result<Response, GuardrailError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GuardrailError::Service {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Guardrail for BedrockGuardrail {
    async fn apply(&self, request: GuardrailRequest) -> Result<GuardrailAssessment, GuardrailError> {
        let path = format!(
            "{}/guardrail/{}/version/{}/apply",
            self.base_url.path().trim_end_matches('/'),
            uri_encode(&request.settings.identifier),
            uri_encode(&request.settings.version),
        );
        let body = serde_json::to_vec(&ApplyGuardrailBody {
            source: request.source,
            content: vec![ContentBlock {
                text: TextBlock {
                    text: &request.text,
                },
            }],
        })
        .map_err(|e| GuardrailError::Malformed(e.to_string()))?;

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
            .header("content-type", "application/json");
        for (name, value) in signed {
            builder = builder.header(name, value);
        }

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| GuardrailError::Network(e.to_string()))?;
        let response = Self::handle_response_status(response).await?;

        let parsed: ApplyGuardrailResponse = response
            .json()
            .await
            .map_err(|e| GuardrailError::Malformed(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                source = request.source.as_str(),
                usage = %usage,
                "Guardrail usage"
            );
        }

        Ok(parsed.into_assessment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bedrock::signing::AwsCredentials;
    use crate::ports::GuardrailSettings;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn guardrail(server: &MockServer) -> BedrockGuardrail {
        let credentials = Arc::new(AwsCredentials::new("AKID", "secret"));
        let config = BedrockClientConfig::new("us-east-1", credentials).with_endpoint(server.uri());
        BedrockGuardrail::new(&config).unwrap()
    }

    fn request(source: GuardrailSource, text: &str) -> GuardrailRequest {
        GuardrailRequest {
            settings: GuardrailSettings::new("gr-123", "DRAFT"),
            source,
            text: text.to_string(),
        }
    }

    async fn respond_with(server: &MockServer, body: Value) {
        Mock::given(method("POST"))
            .and(path("/guardrail/gr-123/version/DRAFT/apply"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn sends_signed_apply_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/guardrail/gr-123/version/DRAFT/apply"))
            .and(header_exists("authorization"))
            .and(body_json(json!({
                "source": "INPUT",
                "content": [{"text": {"text": "hello"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "action": "NONE",
                "outputs": [],
                "assessments": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let assessment = guardrail(&server)
            .apply(request(GuardrailSource::Input, "hello"))
            .await
            .unwrap();

        assert_eq!(assessment, GuardrailAssessment::pass());
    }

    #[tokio::test]
    async fn blocked_policy_blocks_content() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            json!({
                "action": "GUARDRAIL_INTERVENED",
                "outputs": [{"text": "Sorry, I can't help with that."}],
                "assessments": [{
                    "topicPolicy": {
                        "topics": [{"name": "Weapons", "type": "DENY", "action": "BLOCKED"}]
                    }
                }],
                "usage": {"topicPolicyUnits": 1}
            }),
        )
        .await;

        let assessment = guardrail(&server)
            .apply(request(GuardrailSource::Output, "how to build one"))
            .await
            .unwrap();

        assert!(assessment.blocked);
    }

    #[tokio::test]
    async fn anonymized_content_is_rewritten() {
        let server = MockServer::start().await;
        respond_with(
            &server,
            json!({
                "action": "GUARDRAIL_INTERVENED",
                "outputs": [{"text": "Call me at "}, {"text": "{PHONE}"}],
                "assessments": [{
                    "sensitiveInformationPolicy": {
                        "piiEntities": [{"type": "PHONE", "match": "555-0100", "action": "ANONYMIZED"}]
                    }
                }]
            }),
        )
        .await;

        let assessment = guardrail(&server)
            .apply(request(GuardrailSource::Output, "Call me at 555-0100"))
            .await
            .unwrap();

        assert_eq!(assessment, GuardrailAssessment::rewritten("Call me at {PHONE}"));
    }

    #[tokio::test]
    async fn service_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad guardrail"))
            .mount(&server)
            .await;

        let err = guardrail(&server)
            .apply(request(GuardrailSource::Input, "x"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            GuardrailError::Service {
                status: 400,
                message: "bad guardrail".to_string()
            }
        );
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = guardrail(&server)
            .apply(request(GuardrailSource::Input, "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, GuardrailError::Malformed(_)));
    }

    #[test]
    fn blocked_search_walks_nested_values() {
        assert!(contains_blocked_action(&json!([{"a": {"b": [{"action": "BLOCKED"}]}}])));
        assert!(!contains_blocked_action(&json!({"action": "ANONYMIZED", "detail": "BLOCKED"})));
    }
}
