//! Bearer token session management
//!
//! This module owns the access/refresh token pair of the connection server
//! REST API. The session starts unauthenticated; the first request logs in,
//! and a rejected access token is replaced by exchanging the refresh token
//! (falling back to a full login when that fails or no refresh token is held).
//!
//! The token pair lives behind one async mutex. Concurrent scrapes that all
//! see a rejected token serialize on it; whoever enters second notices the
//! token already changed and reuses it instead of refreshing again.

use crate::config::ConnectionServerSettings;
use crate::error::{ExporterError, Result};
use crate::horizon::types::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, LOGIN_ENDPOINT,
    REFRESH_ENDPOINT,
};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Tokens returned by a successful login
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

#[derive(Debug)]
enum AuthState {
    Unauthenticated,
    Authenticated(TokenPair),
}

/// Number of token exchanges performed, by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthStats {
    pub logins: u64,
    pub refreshes: u64,
}

/// Manages the bearer token session with a connection server
pub struct SessionManager {
    http: Client,
    settings: Arc<ConnectionServerSettings>,
    state: Mutex<AuthState>,
    logins: AtomicU64,
    refreshes: AtomicU64,
}

impl SessionManager {
    pub fn new(http: Client, settings: Arc<ConnectionServerSettings>) -> Self {
        Self {
            http,
            settings,
            state: Mutex::new(AuthState::Unauthenticated),
            logins: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> AuthStats {
        AuthStats {
            logins: self.logins.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
        }
    }

    /// Current access token, logging in first if the session is unauthenticated
    pub async fn access_token(&self) -> Result<SecretString> {
        let mut state = self.state.lock().await;

        if let AuthState::Authenticated(tokens) = &*state {
            return Ok(tokens.access_token.clone());
        }

        info!("Authenticating with Horizon connection server...");
        let tokens = self.login().await?;
        let access = tokens.access_token.clone();
        *state = AuthState::Authenticated(tokens);
        Ok(access)
    }

    /// Replace an access token the server rejected
    ///
    /// Returns the token to retry with. If another task already replaced
    /// `rejected`, its token is returned without contacting the server.
    pub async fn reauthenticate(&self, rejected: &SecretString) -> Result<SecretString> {
        let mut state = self.state.lock().await;

        let refresh_token = match &*state {
            AuthState::Authenticated(tokens)
                if tokens.access_token.expose_secret() != rejected.expose_secret() =>
            {
                debug!("Access token already replaced by a concurrent request");
                return Ok(tokens.access_token.clone());
            }
            AuthState::Authenticated(tokens) => tokens.refresh_token.clone(),
            AuthState::Unauthenticated => None,
        };

        if let Some(refresh_token) = refresh_token {
            match self.refresh(&refresh_token).await {
                Ok(access_token) => {
                    info!("Refreshed Horizon access token");
                    *state = AuthState::Authenticated(TokenPair {
                        access_token: access_token.clone(),
                        refresh_token: Some(refresh_token),
                    });
                    return Ok(access_token);
                }
                Err(e) => warn!("Token refresh failed, logging in again: {}", e),
            }
        }

        match self.login().await {
            Ok(tokens) => {
                info!("Re-authenticated with Horizon connection server");
                let access = tokens.access_token.clone();
                *state = AuthState::Authenticated(tokens);
                Ok(access)
            }
            Err(e) => {
                warn!("Authentication failed, dropping session: {}", e);
                *state = AuthState::Unauthenticated;
                Err(e)
            }
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.settings.url, endpoint)
    }

    async fn login(&self) -> Result<TokenPair> {
        self.logins.fetch_add(1, Ordering::Relaxed);

        let body = LoginRequest {
            domain: &self.settings.domain,
            username: &self.settings.username,
            password: self.settings.password.expose_secret(),
        };
        let url = self.url(LOGIN_ENDPOINT);
        debug!("Sending login request to {}", url);

        let response = self.http.post(&url).json(&body).send().await?;
        let response = check_auth_status(response, &url, "login")?;
        let tokens: LoginResponse = response.json().await?;

        Ok(TokenPair {
            access_token: SecretString::new(tokens.access_token.into()),
            refresh_token: Some(SecretString::new(tokens.refresh_token.into())),
        })
    }

    async fn refresh(&self, refresh_token: &SecretString) -> Result<SecretString> {
        self.refreshes.fetch_add(1, Ordering::Relaxed);

        let body = RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
        };
        let url = self.url(REFRESH_ENDPOINT);
        debug!("Sending token refresh request to {}", url);

        let response = self.http.post(&url).json(&body).send().await?;
        let response = check_auth_status(response, &url, "token refresh")?;
        let refreshed: RefreshResponse = response.json().await?;

        Ok(SecretString::new(refreshed.access_token.into()))
    }
}

fn check_auth_status(
    response: reqwest::Response,
    url: &str,
    operation: &str,
) -> Result<reqwest::Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ExporterError::Auth(format!(
            "{} rejected with status {}",
            operation,
            response.status().as_u16()
        ))),
        status => Err(ExporterError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        }),
    }
}
