pub mod client;
pub mod session;
pub mod types;
pub mod uag;
pub mod xml;

pub use client::ConnectionServerClient;
pub use session::SessionManager;
pub use uag::UagClient;

use crate::error::{ExporterError, Result};
use std::time::Duration;

/// HTTP client shared by the API clients of one backend
pub(crate) fn http_client(timeout_seconds: u64, verify_ssl: bool) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .danger_accept_invalid_certs(!verify_ssl)
        .build()?)
}

/// Reject non-success responses
pub(crate) fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ExporterError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}
