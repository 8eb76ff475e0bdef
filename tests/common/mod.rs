//! In-process mock upstreams shared by the integration tests

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use horizon_exporter::config::{ConnectionServerSettings, UagSettings};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const UAG_STATS: &str = include_str!("../fixtures/uag_stats.xml");

/// Spawn `app` on an ephemeral loopback port and return its base URL
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock listener");
    let addr = listener.local_addr().expect("Mock listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

pub fn connection_server_settings(url: &str) -> ConnectionServerSettings {
    ConnectionServerSettings {
        url: url.to_string(),
        domain: "CORP".to_string(),
        username: "monitor".to_string(),
        password: SecretString::new("secret".into()),
        timeout_seconds: 5,
        verify_ssl: true,
    }
}

pub fn uag_settings() -> UagSettings {
    UagSettings {
        username: "admin".to_string(),
        password: SecretString::new("secret".into()),
        scheme: "http".to_string(),
        timeout_seconds: 5,
        verify_ssl: true,
    }
}

/// Behaviour of the mock connection server
#[derive(Debug, Clone)]
pub struct MockBehaviour {
    /// Access token handed out by login number n (1-based) is `login-n`
    /// unless overridden here
    pub login_token: Option<String>,
    pub login_ok: bool,
    pub refresh_ok: bool,
    /// Token the monitoring endpoints accept; `None` rejects everything
    pub accepted_token: Option<String>,
    pub gateways: Value,
    pub connection_servers: Value,
}

impl Default for MockBehaviour {
    fn default() -> Self {
        Self {
            login_token: Some("expired".to_string()),
            login_ok: true,
            refresh_ok: true,
            accepted_token: Some("fresh".to_string()),
            gateways: json!([]),
            connection_servers: json!([]),
        }
    }
}

/// Request counters of the mock connection server
#[derive(Debug, Default)]
pub struct MockCounters {
    pub logins: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub gets: AtomicUsize,
}

impl MockCounters {
    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct MockState {
    behaviour: Arc<MockBehaviour>,
    counters: Arc<MockCounters>,
}

async fn login(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    let n = state.counters.logins.fetch_add(1, Ordering::SeqCst) + 1;
    let credentials_present = body["domain"] == "CORP"
        && body["username"] == "monitor"
        && body["password"] == "secret";

    if !state.behaviour.login_ok || !credentials_present {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let access = state
        .behaviour
        .login_token
        .clone()
        .unwrap_or_else(|| format!("login-{}", n));
    Json(json!({"access_token": access, "refresh_token": "refresh"})).into_response()
}

async fn refresh(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.counters.refreshes.fetch_add(1, Ordering::SeqCst);

    if !state.behaviour.refresh_ok || body["refresh_token"] != "refresh" {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({"access_token": "fresh"})).into_response()
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match (&state.behaviour.accepted_token, presented) {
        (Some(token), Some(presented)) => presented == format!("Bearer {}", token),
        _ => false,
    }
}

async fn gateways(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.counters.gets.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.behaviour.gateways.clone()).into_response()
}

async fn connection_servers(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.counters.gets.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.behaviour.connection_servers.clone()).into_response()
}

/// Start a mock connection server, returning its URL and request counters
pub async fn mock_connection_server(behaviour: MockBehaviour) -> (String, Arc<MockCounters>) {
    let counters = Arc::new(MockCounters::default());
    let state = MockState {
        behaviour: Arc::new(behaviour),
        counters: counters.clone(),
    };

    let app = Router::new()
        .route("/rest/login", post(login))
        .route("/rest/refresh", post(refresh))
        .route("/rest/monitor/v3/gateways", get(gateways))
        .route("/rest/monitor/v3/connection-servers", get(connection_servers))
        .with_state(state);

    (spawn(app).await, counters)
}

/// Start a mock UAG answering the monitor endpoint with `body`
///
/// Basic auth must be `admin:secret` (`YWRtaW46c2VjcmV0`).
pub async fn mock_uag(body: &'static str) -> String {
    let app = Router::new().route(
        "/rest/v1/monitor/stats",
        get(move |headers: HeaderMap| async move {
            let presented = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());
            if presented != Some("Basic YWRtaW46c2VjcmV0") {
                return StatusCode::UNAUTHORIZED.into_response();
            }
            ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
        }),
    );

    spawn(app).await
}
