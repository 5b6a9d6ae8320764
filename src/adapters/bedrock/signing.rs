//! AWS Signature Version 4 request signing.
//!
//! Bedrock endpoints authenticate every request with a SigV4 `Authorization`
//! header derived from the canonical form of the request:
//!
//! ```text
//! canonical request ─sha256─► string to sign ─hmac(signing key)─► signature
//! signing key = hmac(hmac(hmac(hmac("AWS4" + secret, date), region), service), "aws4_request")
//! ```

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Long-term or temporary AWS credentials.
#[derive(Debug)]
pub struct AwsCredentials {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::new(secret_access_key.into()),
            session_token: None,
        }
    }

    /// Adds an STS session token (temporary credentials).
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::new(token.into()));
        self
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }
}

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone, Copy)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    /// `host[:port]` exactly as sent in the `Host` header.
    pub host: &'a str,
    /// Path as sent on the wire (already percent-encoded).
    pub path: &'a str,
    /// Canonical query string (sorted, encoded); empty when there is none.
    pub query: &'a str,
    /// Additional headers to sign, e.g. `content-type`.
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

/// Signs requests for one region and service.
#[derive(Debug)]
pub struct SigV4Signer {
    credentials: std::sync::Arc<AwsCredentials>,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(
        credentials: std::sync::Arc<AwsCredentials>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Computes the headers to attach to `request`: `authorization`,
    /// `x-amz-date`, and `x-amz-security-token` for temporary credentials.
    pub fn sign(&self, request: &SignableRequest<'_>, time: DateTime<Utc>) -> Vec<(&'static str, String)> {
        let amz_date = time.format("%Y%m%dT%H%M%SZ").to_string();
        let date = time.format("%Y%m%d").to_string();
        let token = self
            .credentials
            .session_token
            .as_ref()
            .map(|t| t.expose_secret().to_string());

        let mut headers: Vec<(String, String)> = request
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
            .collect();
        headers.push(("host".to_string(), request.host.to_string()));
        headers.push(("x-amz-date".to_string(), amz_date.clone()));
        if let Some(token) = &token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }
        headers.sort();

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            request.method,
            canonical_uri(request.path),
            request.query,
            canonical_headers,
            signed_headers,
            hex_encode(&Sha256::digest(request.payload)),
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex_encode(&Sha256::digest(canonical_request.as_bytes())),
        );

        let key = self.signing_key(&date);
        let signature = hex_encode(&hmac(&key, string_to_sign.as_bytes()));

        let mut out = vec![
            (
                "authorization",
                format!(
                    "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                    ALGORITHM, self.credentials.access_key_id, scope, signed_headers, signature
                ),
            ),
            ("x-amz-date", amz_date),
        ];
        if let Some(token) = token {
            out.push(("x-amz-security-token", token));
        }
        out
    }

    fn signing_key(&self, date: &str) -> Vec<u8> {
        let secret = format!("AWS4{}", self.credentials.secret_access_key.expose_secret());
        let k_date = hmac(secret.as_bytes(), date.as_bytes());
        let k_region = hmac(&k_date, self.region.as_bytes());
        let k_service = hmac(&k_region, self.service.as_bytes());
        hmac(&k_service, b"aws4_request")
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Percent-encodes `input` per the SigV4 rules: everything except
/// `A-Z a-z 0-9 - _ . ~` is encoded, with uppercase hex digits.
pub fn uri_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Non-S3 services sign the wire path encoded a second time, segment by segment.
fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// Encode bytes to hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
