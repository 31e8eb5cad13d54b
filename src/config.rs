use std::collections::HashMap;
use std::env;

use tracing::info;

/// Process-wide gateway configuration, built once at startup and passed by
/// reference (via axum state) to every component that needs it.
///
/// The provider URL and the anon key are public-facing values; the service
/// role key is privileged and has no default anywhere.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the managed database/auth provider.
    pub provider_url: String,
    /// Public anon-scoped API key, sent as the `apikey` header.
    pub anon_key: String,
    /// Privileged service-role key. Bypasses row-level security.
    pub service_role_key: String,
    /// Listen port for the plain HTTP server.
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

impl GatewayConfig {
    /// Build the configuration from the process environment.
    ///
    /// Missing required values are fatal at startup, never surfaced to
    /// callers as a validation outcome.
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider_url = require_var("SIGNAL_PROVIDER_URL")?;
        let anon_key = require_var("SIGNAL_PROVIDER_ANON_KEY")?;
        let service_role_key = require_var("SIGNAL_PROVIDER_SERVICE_KEY")?;

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidVar {
                name: "PORT",
                reason: e.to_string(),
            })?,
            Err(_) => 3000,
        };

        Ok(Self {
            provider_url: provider_url.trim_end_matches('/').to_string(),
            anon_key,
            service_role_key,
            port,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Load secrets from AWS Secrets Manager and set them as environment variables.
///
/// If SIGNAL_GATEWAY_SSM_ARN is set, it:
/// 1. Fetches the secret from AWS Secrets Manager
/// 2. Parses the JSON secret string
/// 3. Sets all key-value pairs as environment variables
///
/// This runs during cold-start initialization, before the first request and
/// before any worker threads touch the environment.
pub async fn load_secrets_from_manager() -> Result<(), Box<dyn std::error::Error>> {
    let secret_arn = match env::var("SIGNAL_GATEWAY_SSM_ARN") {
        Ok(arn) => arn,
        Err(_) => {
            info!("SIGNAL_GATEWAY_SSM_ARN not set, skipping secrets loading");
            return Ok(());
        }
    };

    info!("Loading secrets from AWS Secrets Manager: {}", secret_arn);

    let aws_config = aws_config::load_from_env().await;
    let client = aws_sdk_secretsmanager::Client::new(&aws_config);

    let response = client
        .get_secret_value()
        .secret_id(&secret_arn)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch secret from Secrets Manager: {}", e))?;

    let secret_string = response
        .secret_string()
        .ok_or("Secret does not contain a string value")?;

    let secrets: HashMap<String, String> = serde_json::from_str(secret_string)
        .map_err(|e| format!("Failed to parse secret JSON: {}", e))?;

    info!("Loaded {} secrets from Secrets Manager", secrets.len());

    for (key, value) in secrets {
        env::set_var(&key, &value);
        info!("Set environment variable: {}", key);
    }

    Ok(())
}
