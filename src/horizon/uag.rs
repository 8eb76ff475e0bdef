//! Unified Access Gateway Monitoring Client
//!
//! Fetches `/rest/v1/monitor/stats` from a UAG admin API using HTTP basic
//! authentication and decodes the XML body into a document tree.
//!
//! The gateway to query is chosen per request: a bare host or `host:port`
//! gets the configured scheme, a full URL is used as given.

use crate::config::UagSettings;
use crate::error::{ExporterError, Result};
use crate::horizon::types::UAG_MONITOR_ENDPOINT;
use crate::horizon::{check_status, http_client, xml};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

pub struct UagClient {
    http: Client,
    settings: UagSettings,
}

impl UagClient {
    pub fn new(settings: UagSettings) -> Result<Self> {
        let http = http_client(settings.timeout_seconds, settings.verify_ssl)?;
        Ok(Self { http, settings })
    }

    /// Base URL for a scrape target
    pub fn base_url(&self, target: &str) -> Result<String> {
        let target = target.trim().trim_end_matches('/');
        if target.is_empty() {
            return Err(ExporterError::Config("empty target".to_string()));
        }
        if target.contains("://") {
            Ok(target.to_string())
        } else {
            Ok(format!("{}://{}", self.settings.scheme, target))
        }
    }

    /// Fetch and decode the monitoring statistics of `target`
    pub async fn monitor_stats(&self, target: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url(target)?, UAG_MONITOR_ENDPOINT);
        debug!("Fetching UAG statistics from {}", url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/xml")
            .basic_auth(
                &self.settings.username,
                Some(self.settings.password.expose_secret()),
            )
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ExporterError::Auth(format!(
                "UAG {} rejected the configured credentials",
                target
            )));
        }

        let body = check_status(response, &url)?.text().await?;
        xml::parse(&body)
    }
}
