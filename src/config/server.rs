//! Listener and logging configuration

use std::net::SocketAddr;

use serde::{Deserialize, Deserializer};

use super::error::ValidationError;

/// Where the relay listens and how it logs
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment stage; selects the log output format
    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Browser origins allowed to open the relay socket, given as a
    /// comma-separated list. Empty allows any origin.
    #[serde(default, deserialize_with = "comma_list")]
    pub cors_origins: Vec<String>,
}

/// Deployment stage
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Log line encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Environment {
    /// Production ships JSON lines to the log collector.
    pub fn log_format(self) -> LogFormat {
        match self {
            Self::Development => LogFormat::Pretty,
            Self::Production => LogFormat::Json,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| ValidationError::InvalidSocketAddr(raw))
    }

    pub fn log_format(&self) -> LogFormat {
        self.environment.log_format()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            cors_origins: Vec::new(),
        }
    }
}

fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info,bedrock_relay=debug,tower_http=info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relay_listens_on_8000_with_pretty_logs() {
        let config = ServerConfig::default();

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8000");
        assert_eq!(config.log_format(), LogFormat::Pretty);
        assert!(config.log_level.contains("bedrock_relay=debug"));
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn production_logs_json() {
        let config: ServerConfig = serde_json::from_value(json!({"environment": "production"})).unwrap();
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let result = serde_json::from_value::<ServerConfig>(json!({"environment": "staging"}));
        assert!(result.is_err());
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let config: ServerConfig = serde_json::from_value(json!({
            "cors_origins": " http://localhost:5173 ,,https://chat.example.com "
        }))
        .unwrap();

        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "https://chat.example.com"]
        );
    }

    #[test]
    fn unparseable_bind_address_fails_validation() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSocketAddr(_))
        ));

        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }
}
