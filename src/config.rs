use crate::error::{ExporterError, Result as ExporterResult};
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

/// Default listen port of the connection-server exporter
pub const DEFAULT_CONNECTION_SERVER_PORT: u16 = 18000;

/// Default listen port of the UAG exporter
pub const DEFAULT_UAG_PORT: u16 = 19000;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub connection_server: ConnectionServerConfig,
    #[serde(default)]
    pub uag: UagConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection server REST API (`/rest/login`, `/rest/monitor/v3/...`)
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionServerConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

/// Unified Access Gateway admin API (`/rest/v1/monitor/stats`)
#[derive(Debug, Deserialize, Clone)]
pub struct UagConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Validated connection server settings
#[derive(Debug, Clone)]
pub struct ConnectionServerSettings {
    pub url: String,
    pub domain: String,
    pub username: String,
    pub password: SecretString,
    pub timeout_seconds: u64,
    pub verify_ssl: bool,
}

/// Validated UAG settings
#[derive(Debug, Clone)]
pub struct UagSettings {
    pub username: String,
    pub password: SecretString,
    pub scheme: String,
    pub timeout_seconds: u64,
    pub verify_ssl: bool,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_verify_ssl() -> bool {
    true
}

impl Default for ConnectionServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            domain: None,
            username: None,
            password: None,
            timeout_seconds: default_timeout(),
            verify_ssl: default_verify_ssl(),
        }
    }
}

impl Default for UagConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            scheme: default_scheme(),
            timeout_seconds: default_timeout(),
            verify_ssl: default_verify_ssl(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: None,
        }
    }
}

/// Treats absent and blank values alike
fn required(value: &Option<String>, name: &str) -> ExporterResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ExporterError::ConfigMissing(name.to_string())),
    }
}

fn required_secret(value: &Option<SecretString>, name: &str) -> ExporterResult<SecretString> {
    value
        .clone()
        .ok_or_else(|| ExporterError::ConfigMissing(name.to_string()))
}

impl ConnectionServerConfig {
    /// Check that every required value is present
    pub fn validate(&self) -> ExporterResult<ConnectionServerSettings> {
        let url = required(&self.url, "HORIZON_API_CONNECTION_URL")?;
        Ok(ConnectionServerSettings {
            url: url.trim_end_matches('/').to_string(),
            domain: required(&self.domain, "HORIZON_API_CONNECTION_DOMAIN")?,
            username: required(&self.username, "HORIZON_API_CONNECTION_USERNAME")?,
            password: required_secret(&self.password, "HORIZON_API_CONNECTION_PASSWORD")?,
            timeout_seconds: self.timeout_seconds,
            verify_ssl: self.verify_ssl,
        })
    }
}

impl UagConfig {
    /// Check that every required value is present
    pub fn validate(&self) -> ExporterResult<UagSettings> {
        Ok(UagSettings {
            username: required(&self.username, "HORIZON_API_GATEWAY_USERNAME")?,
            password: required_secret(&self.password, "HORIZON_API_GATEWAY_PASSWORD")?,
            scheme: self.scheme.clone(),
            timeout_seconds: self.timeout_seconds,
            verify_ssl: self.verify_ssl,
        })
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            // HORIZON_EXPORTER_<SECTION>__<KEY>
            .add_source(
                config::Environment::with_prefix("HORIZON_EXPORTER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
