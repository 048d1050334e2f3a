//! Immutable configuration model.
//!
//! Built once by the composition root (see `paygate-app`) and passed by
//! reference; components never read the environment themselves.

use serde::{Deserialize, Serialize};

/// Known provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Asaas,
    Custom,
}

impl AsRef<str> for ProviderKind {
    fn as_ref(&self) -> &str {
        match self {
            Self::Asaas => "asaas",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asaas" => Ok(Self::Asaas),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown payment provider: {}", s)),
        }
    }
}

/// Operating mode of the custom (simulated) gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    #[default]
    Test,
    Production,
}

impl std::str::FromStr for GatewayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            _ => Err(format!("Unknown custom gateway mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsaasConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for AsaasConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.asaas.com/v3".into(),
            timeout_secs: 30,
        }
    }
}

/// Connection parameters of the audit-log store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5433,
            database: "payment_api".into(),
            user: "payment_api".into(),
            password: "payment_api_secret".into(),
        }
    }
}

/// Retention of the in-process audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Oldest entries are dropped beyond this count
    pub max_entries: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 6379,
            password: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 64 hex characters (32 bytes) keying AES-256-GCM field encryption
    pub encryption_key: Option<String>,
    /// Requests allowed per tenant within one window
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: u64,
    /// Shared token expected on inbound webhook deliveries
    pub webhook_token: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            encryption_key: None,
            rate_limit_max_requests: 100,
            rate_limit_window_ms: 60_000,
            webhook_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Complete service configuration.
///
/// `provider` stays a raw string so that an unrecognized value is reported
/// by the provider registry, at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentApiConfig {
    pub provider: String,
    pub custom_gateway_mode: GatewayMode,
    pub asaas: AsaasConfig,
    pub db: DatabaseConfig,
    pub audit: AuditConfig,
    pub redis: RedisConfig,
    pub security: SecurityConfig,
    pub server: ServerConfig,
}

impl Default for PaymentApiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Asaas.to_string(),
            custom_gateway_mode: GatewayMode::Test,
            asaas: AsaasConfig::default(),
            db: DatabaseConfig::default(),
            audit: AuditConfig::default(),
            redis: RedisConfig::default(),
            security: SecurityConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl PaymentApiConfig {
    /// Test-mode configuration selecting the custom gateway.
    pub fn custom_test() -> Self {
        Self {
            provider: ProviderKind::Custom.to_string(),
            ..Self::default()
        }
    }
}
