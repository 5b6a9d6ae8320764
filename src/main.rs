//! Bedrock relay server.
//!
//! Loads configuration from the environment, builds the Bedrock adapters and
//! serves the relay until Ctrl-C or SIGTERM.

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use bedrock_relay::adapters::bedrock::{
    AwsCredentials, BedrockAgentRuntime, BedrockClientConfig, BedrockGuardrail,
};
use bedrock_relay::adapters::http::app_router;
use bedrock_relay::adapters::websocket::RelayState;
use bedrock_relay::application::{
    FilterStages, RelayHandlerConfig, RelayMessageHandler, SafetyFilter,
};
use bedrock_relay::config::{AppConfig, LogFormat, ValidationError};
use bedrock_relay::ports::{AgentTarget, GuardrailSettings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let handler = build_handler(&config)?;
    let app = app_router(
        RelayState::new(Arc::new(handler)),
        &config.server.cors_origins,
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "bedrock relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("bedrock relay stopped");
    Ok(())
}

/// `RUST_LOG` overrides the configured filter; production logs are JSON.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let json = config.server.log_format() == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

fn build_handler(config: &AppConfig) -> Result<RelayMessageHandler, Box<dyn std::error::Error>> {
    let resolved = config
        .aws
        .credentials()
        .ok_or(ValidationError::MissingCredentials)?;
    let mut credentials = AwsCredentials::new(resolved.access_key_id, resolved.secret_access_key);
    if let Some(token) = resolved.session_token {
        credentials = credentials.with_session_token(token);
    }
    let credentials = Arc::new(credentials);

    let mut agent_client = BedrockClientConfig::new(config.aws.region.clone(), credentials.clone());
    if let Some(endpoint) = &config.aws.agent_endpoint {
        agent_client = agent_client.with_endpoint(endpoint.clone());
    }
    let mut runtime_client = BedrockClientConfig::new(config.aws.region.clone(), credentials);
    if let Some(endpoint) = &config.aws.runtime_endpoint {
        runtime_client = runtime_client.with_endpoint(endpoint.clone());
    }

    let agent = Arc::new(BedrockAgentRuntime::new(&agent_client)?);
    let guardrail = Arc::new(BedrockGuardrail::new(&runtime_client)?);

    let settings = config
        .guardrail
        .identifier()
        .map(|id| GuardrailSettings::new(id, config.guardrail.version.clone()));
    match &settings {
        Some(s) => tracing::info!(
            guardrail_id = %s.identifier,
            version = %s.version,
            check_input = config.guardrail.check_input,
            check_output = config.guardrail.check_output,
            "Guardrail enabled"
        ),
        None => tracing::info!("Guardrail disabled"),
    }

    let filter = SafetyFilter::new(guardrail, settings)
        .with_stages(FilterStages {
            input: config.guardrail.check_input,
            output: config.guardrail.check_output,
        })
        .with_timeout(config.guardrail.timeout());

    let target = AgentTarget::new(
        config.agent.agent_id.clone(),
        config.agent.agent_alias_id.clone(),
        config.agent.session_id.clone(),
    );
    let relay_config = RelayHandlerConfig {
        enable_trace: config.agent.enable_trace,
        agent_timeout: config.relay.agent_timeout(),
        legacy_sentinels: config.relay.legacy_sentinels,
    };

    Ok(RelayMessageHandler::new(agent, filter, target, relay_config))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
