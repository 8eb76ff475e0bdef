//! Horizon REST API wire types
//!
//! - `POST /rest/login` → [`LoginRequest`] / [`LoginResponse`]
//! - `POST /rest/refresh` → [`RefreshRequest`] / [`RefreshResponse`]
//!
//! Monitoring endpoints are decoded into untyped document trees and mapped
//! by the metric tables instead of typed structs.

use serde::{Deserialize, Serialize};

pub const LOGIN_ENDPOINT: &str = "/rest/login";
pub const REFRESH_ENDPOINT: &str = "/rest/refresh";
pub const GATEWAYS_ENDPOINT: &str = "/rest/monitor/v3/gateways";
pub const CONNECTION_SERVERS_ENDPOINT: &str = "/rest/monitor/v3/connection-servers";
pub const UAG_MONITOR_ENDPOINT: &str = "/rest/v1/monitor/stats";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub domain: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}
