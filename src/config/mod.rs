//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `BEDROCK_RELAY` prefix and nested values are separated by double underscores.
//!
//! # Variable names
//!
//! | Setting | Variable | Also read |
//! |---------|----------|-----------|
//! | region | `BEDROCK_RELAY__AWS__REGION` | |
//! | access key | `BEDROCK_RELAY__AWS__ACCESS_KEY_ID` | `AWS_ACCESS_KEY_ID`, `ACCESS_KEY_ID` |
//! | secret key | `BEDROCK_RELAY__AWS__SECRET_ACCESS_KEY` | `AWS_SECRET_ACCESS_KEY`, `SECRET_ACCESS_KEY` |
//! | session token | `BEDROCK_RELAY__AWS__SESSION_TOKEN` | `AWS_SESSION_TOKEN` |
//! | agent | `BEDROCK_RELAY__AGENT__AGENT_ID`, `BEDROCK_RELAY__AGENT__AGENT_ALIAS_ID` | |
//! | listener | `BEDROCK_RELAY__SERVER__HOST`, `BEDROCK_RELAY__SERVER__PORT` | |
//! | CORS | `BEDROCK_RELAY__SERVER__CORS_ORIGINS` (comma-separated) | |
//!
//! A bare `AWS_REGION` is not read: `.env` files written for older
//! deployments must rename it to `BEDROCK_RELAY__AWS__REGION`.
//!
//! # Example
//!
//! ```no_run
//! use bedrock_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Relay listening on port {}", config.server.port);
//! ```

mod agent;
mod aws;
mod error;
mod guardrail;
mod relay;
mod server;

pub use agent::AgentConfig;
pub use aws::{AwsConfig, ResolvedCredentials};
pub use error::{ConfigError, ValidationError};
pub use guardrail::GuardrailConfig;
pub use relay::RelayConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// AWS region, credentials and endpoint overrides
    pub aws: AwsConfig,

    /// Target agent
    pub agent: AgentConfig,

    /// Content-safety check
    #[serde(default)]
    pub guardrail: GuardrailConfig,

    /// Relay timeouts and compatibility switches
    #[serde(default)]
    pub relay: RelayConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `BEDROCK_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `BEDROCK_RELAY__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `BEDROCK_RELAY__AGENT__AGENT_ID=...` -> `agent.agent_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BEDROCK_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.aws.validate()?;
        self.agent.validate()?;
        self.guardrail.validate()?;
        self.relay.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "BEDROCK_RELAY__AWS__REGION",
        "BEDROCK_RELAY__AWS__ACCESS_KEY_ID",
        "BEDROCK_RELAY__AWS__SECRET_ACCESS_KEY",
        "BEDROCK_RELAY__AGENT__AGENT_ID",
        "BEDROCK_RELAY__AGENT__AGENT_ALIAS_ID",
        "BEDROCK_RELAY__AGENT__SESSION_ID",
        "BEDROCK_RELAY__AGENT__ENABLE_TRACE",
        "BEDROCK_RELAY__GUARDRAIL__ID",
        "BEDROCK_RELAY__GUARDRAIL__CHECK_OUTPUT",
        "BEDROCK_RELAY__RELAY__AGENT_TIMEOUT_SECS",
        "BEDROCK_RELAY__SERVER__PORT",
        "BEDROCK_RELAY__SERVER__ENVIRONMENT",
        "BEDROCK_RELAY__SERVER__CORS_ORIGINS",
    ];

    /// Helper to set the required environment variables
    fn set_minimal_env() {
        env::set_var("BEDROCK_RELAY__AWS__REGION", "us-east-1");
        env::set_var("BEDROCK_RELAY__AWS__ACCESS_KEY_ID", "AKIDEXAMPLE");
        env::set_var("BEDROCK_RELAY__AWS__SECRET_ACCESS_KEY", "secret");
        env::set_var("BEDROCK_RELAY__AGENT__AGENT_ID", "AGENT123");
        env::set_var("BEDROCK_RELAY__AGENT__AGENT_ALIAS_ID", "ALIAS123");
        env::set_var("BEDROCK_RELAY__AGENT__SESSION_ID", "session-1");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.agent.agent_id, "AGENT123");
        assert_eq!(config.agent.session_id, "session-1");
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(config.agent.enable_trace);
        assert!(config.guardrail.identifier().is_none());
        assert_eq!(config.relay.agent_timeout_secs, 120);
        assert!(!config.relay.legacy_sentinels);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("BEDROCK_RELAY__GUARDRAIL__ID", "gr-abc");
        env::set_var("BEDROCK_RELAY__GUARDRAIL__CHECK_OUTPUT", "false");
        env::set_var("BEDROCK_RELAY__AGENT__ENABLE_TRACE", "false");
        env::set_var("BEDROCK_RELAY__RELAY__AGENT_TIMEOUT_SECS", "45");
        env::set_var("BEDROCK_RELAY__SERVER__PORT", "3000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.guardrail.identifier(), Some("gr-abc"));
        assert!(config.guardrail.check_input);
        assert!(!config.guardrail.check_output);
        assert!(!config.agent.enable_trace);
        assert_eq!(config.relay.agent_timeout_secs, 45);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_missing_agent_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::remove_var("BEDROCK_RELAY__AGENT__AGENT_ID");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_production_environment_and_origins() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("BEDROCK_RELAY__SERVER__ENVIRONMENT", "production");
        env::set_var("BEDROCK_RELAY__SERVER__CORS_ORIGINS", "http://a.test,http://b.test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.log_format(), LogFormat::Json);
        assert_eq!(config.server.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
