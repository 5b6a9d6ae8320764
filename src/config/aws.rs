//! AWS connection configuration

use serde::Deserialize;

use super::error::ValidationError;

/// AWS region, credentials and endpoint overrides
#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    /// Region hosting the agent and guardrail (e.g. `us-east-1`)
    pub region: String,

    /// Access key ID; falls back to `AWS_ACCESS_KEY_ID`, then the bare
    /// `ACCESS_KEY_ID` older `.env` files use
    pub access_key_id: Option<String>,

    /// Secret access key; falls back to `AWS_SECRET_ACCESS_KEY`, then
    /// `SECRET_ACCESS_KEY`
    pub secret_access_key: Option<String>,

    /// STS session token; falls back to `AWS_SESSION_TOKEN`
    pub session_token: Option<String>,

    /// Agent runtime base URL override
    pub agent_endpoint: Option<String>,

    /// Bedrock runtime (guardrail) base URL override
    pub runtime_endpoint: Option<String>,
}

/// Credentials after applying the environment fallback.
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AwsConfig {
    /// Credentials from configuration, or from the standard AWS variables.
    pub fn credentials(&self) -> Option<ResolvedCredentials> {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    fn credentials_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<ResolvedCredentials> {
        let pick = |configured: &Option<String>, vars: &[&str]| {
            configured
                .clone()
                .filter(|v| !v.is_empty())
                .or_else(|| {
                    vars.iter()
                        .filter_map(|var| lookup(var))
                        .find(|v| !v.is_empty())
                })
        };

        Some(ResolvedCredentials {
            access_key_id: pick(&self.access_key_id, &["AWS_ACCESS_KEY_ID", "ACCESS_KEY_ID"])?,
            secret_access_key: pick(
                &self.secret_access_key,
                &["AWS_SECRET_ACCESS_KEY", "SECRET_ACCESS_KEY"],
            )?,
            session_token: pick(&self.session_token, &["AWS_SESSION_TOKEN"]),
        })
    }

    /// Validate AWS configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.region.trim().is_empty() {
            return Err(ValidationError::MissingRequired("aws.region"));
        }
        if self.credentials().is_none() {
            return Err(ValidationError::MissingCredentials);
        }
        for (name, endpoint) in [
            ("aws.agent_endpoint", &self.agent_endpoint),
            ("aws.runtime_endpoint", &self.runtime_endpoint),
        ] {
            if let Some(url) = endpoint {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ValidationError::InvalidEndpoint(name));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AwsConfig {
        AwsConfig {
            region: "us-east-1".to_string(),
            access_key_id: Some("AKID".to_string()),
            secret_access_key: Some("secret".to_string()),
            session_token: None,
            agent_endpoint: None,
            runtime_endpoint: None,
        }
    }

    #[test]
    fn configured_credentials_win() {
        let creds = config()
            .credentials_with(|_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(creds.access_key_id, "AKID");
        assert_eq!(creds.secret_access_key, "secret");
        assert_eq!(creds.session_token.as_deref(), Some("from-env"));
    }

    #[test]
    fn falls_back_to_standard_variables() {
        let config = AwsConfig {
            access_key_id: None,
            secret_access_key: None,
            ..config()
        };
        let creds = config
            .credentials_with(|name| match name {
                "AWS_ACCESS_KEY_ID" => Some("ENVKEY".to_string()),
                "AWS_SECRET_ACCESS_KEY" => Some("envsecret".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(creds.access_key_id, "ENVKEY");
        assert!(creds.session_token.is_none());
    }

    #[test]
    fn bare_key_names_from_older_env_files_still_work() {
        let config = AwsConfig {
            access_key_id: None,
            secret_access_key: None,
            ..config()
        };
        let creds = config
            .credentials_with(|name| match name {
                "ACCESS_KEY_ID" => Some("OLDKEY".to_string()),
                "SECRET_ACCESS_KEY" => Some("oldsecret".to_string()),
                "AWS_SECRET_ACCESS_KEY" => Some(String::new()),
                _ => None,
            })
            .unwrap();
        assert_eq!(creds.access_key_id, "OLDKEY");
        assert_eq!(creds.secret_access_key, "oldsecret");
    }

    #[test]
    fn missing_secret_means_no_credentials() {
        let config = AwsConfig {
            secret_access_key: None,
            ..config()
        };
        assert!(config.credentials_with(|_| None).is_none());
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = config().credentials_with(|_| None).unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("secret\""));
    }

    #[test]
    fn rejects_empty_region_and_bad_endpoint() {
        let config_empty = AwsConfig {
            region: " ".to_string(),
            ..config()
        };
        assert_eq!(
            config_empty.validate(),
            Err(ValidationError::MissingRequired("aws.region"))
        );

        let bad_endpoint = AwsConfig {
            agent_endpoint: Some("localhost:4566".to_string()),
            ..config()
        };
        assert_eq!(
            bad_endpoint.validate(),
            Err(ValidationError::InvalidEndpoint("aws.agent_endpoint"))
        );
    }
}
