//! Horizon Connection Server REST Client
//!
//! Client for the monitoring endpoints of a Horizon connection server.
//!
//! # Authentication
//!
//! Requests carry a bearer token managed by [`SessionManager`]. When the
//! server answers `401 Unauthorized`, the client asks the session for a new
//! token (refresh, or full login as fallback) and retries the request exactly
//! once. A second rejection is reported as [`ExporterError::Auth`].
//!
//! # Example
//!
//! ```no_run
//! use horizon_exporter::config::ConnectionServerSettings;
//! use horizon_exporter::horizon::ConnectionServerClient;
//! use secrecy::SecretString;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = ConnectionServerSettings {
//!     url: "https://horizon.example.com".to_string(),
//!     domain: "CORP".to_string(),
//!     username: "monitor".to_string(),
//!     password: SecretString::new("secret".into()),
//!     timeout_seconds: 10,
//!     verify_ssl: true,
//! };
//!
//! let client = ConnectionServerClient::new(settings)?;
//! let gateways = client.monitor_gateways().await?;
//! # Ok(())
//! # }
//! ```

use crate::config::ConnectionServerSettings;
use crate::error::{ExporterError, Result};
use crate::horizon::session::{AuthStats, SessionManager};
use crate::horizon::types::{CONNECTION_SERVERS_ENDPOINT, GATEWAYS_ENDPOINT};
use crate::horizon::{check_status, http_client};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the Horizon connection server REST API
///
/// `Send + Sync`; share it behind an `Arc` across request handlers.
pub struct ConnectionServerClient {
    http: Client,
    settings: Arc<ConnectionServerSettings>,
    session: SessionManager,
}

impl ConnectionServerClient {
    pub fn new(settings: ConnectionServerSettings) -> Result<Self> {
        let http = http_client(settings.timeout_seconds, settings.verify_ssl)?;
        let settings = Arc::new(settings);
        let session = SessionManager::new(http.clone(), settings.clone());
        Ok(Self {
            http,
            settings,
            session,
        })
    }

    /// Query gateway monitoring data
    pub async fn monitor_gateways(&self) -> Result<Value> {
        self.get_json(GATEWAYS_ENDPOINT).await
    }

    /// Query connection server monitoring data
    pub async fn monitor_connection_servers(&self) -> Result<Value> {
        self.get_json(CONNECTION_SERVERS_ENDPOINT).await
    }

    /// Login and refresh counts since startup
    pub fn auth_stats(&self) -> AuthStats {
        self.session.stats()
    }

    /// Authenticated GET, retried once after re-authentication on 401
    async fn get_json(&self, endpoint: &str) -> Result<Value> {
        let url = format!("{}{}", self.settings.url, endpoint);

        let token = self.session.access_token().await?;
        let mut response = self.send_get(&url, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            info!("Access token rejected for {}, re-authenticating", endpoint);
            let token = self.session.reauthenticate(&token).await?;
            response = self.send_get(&url, &token).await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(ExporterError::Auth(format!(
                    "{} still unauthorized after re-authentication",
                    endpoint
                )));
            }
        }

        let response = check_status(response, &url)?;
        debug!("{} response received", endpoint);
        Ok(response.json::<Value>().await?)
    }

    async fn send_get(&self, url: &str, token: &SecretString) -> Result<reqwest::Response> {
        Ok(self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "*/*")
            .bearer_auth(token.expose_secret())
            .send()
            .await?)
    }
}
