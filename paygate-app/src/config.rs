//! Configuration loading from environment.

use std::env;
use std::str::FromStr;

use anyhow::Context;

use paygate_types::{GatewayMode, PaymentApiConfig};

/// Loads configuration from environment variables.
pub fn from_env() -> anyhow::Result<PaymentApiConfig> {
    load(|key| env::var(key).ok())
}

/// Builds the configuration from `lookup`, falling back to defaults for
/// unset or blank variables.
pub fn load(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<PaymentApiConfig> {
    let var = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut config = PaymentApiConfig::default();

    if let Some(provider) = var("PAYMENT_PROVIDER") {
        config.provider = provider.to_lowercase();
    }
    if let Some(mode) = var("CUSTOM_GATEWAY_MODE") {
        config.custom_gateway_mode = mode
            .to_lowercase()
            .parse::<GatewayMode>()
            .map_err(anyhow::Error::msg)?;
    }

    config.asaas.api_key = var("ASAAS_API_KEY");
    if let Some(url) = var("ASAAS_API_URL") {
        config.asaas.api_url = url;
    }
    parse_into(&var, "ASAAS_TIMEOUT_SECS", &mut config.asaas.timeout_secs)?;

    if let Some(host) = var("PAYMENT_DB_HOST") {
        config.db.host = host;
    }
    parse_into(&var, "PAYMENT_DB_PORT", &mut config.db.port)?;
    if let Some(name) = var("PAYMENT_DB_NAME") {
        config.db.database = name;
    }
    if let Some(user) = var("PAYMENT_DB_USER") {
        config.db.user = user;
    }
    if let Some(password) = var("PAYMENT_DB_PASSWORD") {
        config.db.password = password;
    }

    parse_into(
        &var,
        "PAYMENT_AUDIT_LOG_MAX_ENTRIES",
        &mut config.audit.max_entries,
    )?;

    if let Some(host) = var("PAYMENT_REDIS_HOST") {
        config.redis.host = host;
    }
    parse_into(&var, "PAYMENT_REDIS_PORT", &mut config.redis.port)?;
    config.redis.password = var("PAYMENT_REDIS_PASSWORD");

    config.security.encryption_key = var("PAYMENT_ENCRYPTION_KEY");
    parse_into(
        &var,
        "PAYMENT_RATE_LIMIT_MAX",
        &mut config.security.rate_limit_max_requests,
    )?;
    parse_into(
        &var,
        "PAYMENT_RATE_LIMIT_WINDOW_MS",
        &mut config.security.rate_limit_window_ms,
    )?;
    config.security.webhook_token = var("PAYMENT_WEBHOOK_TOKEN");

    parse_into(&var, "PORT", &mut config.server.port)?;

    Ok(config)
}

fn parse_into<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> anyhow::Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = var(key) {
        *target = raw
            .parse()
            .with_context(|| format!("{key} must be a number, got {raw:?}"))?;
    }
    Ok(())
}
