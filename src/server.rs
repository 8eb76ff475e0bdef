//! HTTP Server and Per-Scrape Collection
//!
//! This module implements the two exporter variants as Axum servers.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **Collection**: every `/metrics` request fetches fresh data and renders it;
//!   there is no background loop and nothing is cached between scrapes
//! - **State Management**: API client and metric tables shared through `Arc`
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page
//! - `GET /metrics` - Prometheus metrics in text format
//!   (the UAG variant requires `?target=<host>` and answers 404 without it)
//! - `GET /health` - Liveness check
//!
//! # Error Handling
//!
//! A failed fetch still answers 200 with only the `up` gauge set to 0.
//! Rendering failures answer 500.

use crate::collectors::{
    collect_connection_server_metrics, collect_uag_metrics, uag_table, Collection,
    ConnectionServerTables,
};
use crate::config::{Config, DEFAULT_CONNECTION_SERVER_PORT, DEFAULT_UAG_PORT};
use crate::horizon::{ConnectionServerClient, UagClient};
use crate::mapping::MetricTable;
use crate::metrics::{render_collection, CONNECTION_SERVER_UP, UAG_UP};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct ConnectionServerState {
    client: Arc<ConnectionServerClient>,
    tables: Arc<ConnectionServerTables>,
}

#[derive(Clone)]
struct UagState {
    client: Arc<UagClient>,
    table: Arc<MetricTable>,
}

#[derive(Debug, Deserialize)]
struct TargetQuery {
    target: Option<String>,
}

/// Router of the connection server exporter
pub fn connection_server_router(client: ConnectionServerClient) -> anyhow::Result<Router> {
    let state = ConnectionServerState {
        client: Arc::new(client),
        tables: Arc::new(ConnectionServerTables::new()?),
    };

    Ok(Router::new()
        .route("/", get(connection_server_root_handler))
        .route("/metrics", get(connection_server_metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state))
}

/// Router of the UAG exporter
pub fn uag_router(client: UagClient) -> anyhow::Result<Router> {
    let state = UagState {
        client: Arc::new(client),
        table: Arc::new(uag_table()?),
    };

    Ok(Router::new()
        .route("/", get(uag_root_handler))
        .route("/metrics", get(uag_metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state))
}

pub async fn start_connection_server(config: Config) -> anyhow::Result<()> {
    let settings = config.connection_server.validate()?;
    info!("Horizon connection server: {}", settings.url);

    let client = ConnectionServerClient::new(settings)?;
    let app = connection_server_router(client)?;
    let port = config.server.port.unwrap_or(DEFAULT_CONNECTION_SERVER_PORT);

    serve(app, &config.server.addr, port).await
}

pub async fn start_uag(config: Config) -> anyhow::Result<()> {
    let settings = config.uag.validate()?;
    let client = UagClient::new(settings)?;
    let app = uag_router(client)?;
    let port = config.server.port.unwrap_or(DEFAULT_UAG_PORT);

    serve(app, &config.server.addr, port).await
}

async fn serve(app: Router, addr: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", addr, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn metrics_response(up_name: &str, up_help: &str, collection: &Collection) -> Response {
    match render_collection(up_name, up_help, collection) {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn connection_server_metrics_handler(
    State(state): State<ConnectionServerState>,
) -> Response {
    info!("Collecting metrics from Horizon connection server");
    let collection = collect_connection_server_metrics(&state.client, &state.tables).await;
    metrics_response(
        CONNECTION_SERVER_UP,
        "Whether the Horizon connection server API was reachable (1=up, 0=down)",
        &collection,
    )
}

async fn uag_metrics_handler(
    State(state): State<UagState>,
    Query(query): Query<TargetQuery>,
) -> Response {
    let target = match query.target.as_deref().map(str::trim) {
        Some(target) if !target.is_empty() => target.to_string(),
        _ => return (StatusCode::NOT_FOUND, "No target defined\n").into_response(),
    };

    info!("Collecting metrics from UAG {}", target);
    let collection = collect_uag_metrics(&state.client, &state.table, &target).await;
    metrics_response(
        UAG_UP,
        "Whether the UAG monitoring API was reachable (1=up, 0=down)",
        &collection,
    )
}

async fn connection_server_root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>Horizon Exporter</title></head>
<body>
<h1>Horizon Connection Server Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn uag_root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>Horizon UAG Exporter</title></head>
<body>
<h1>Horizon UAG Exporter</h1>
<p>Scrape <code>/metrics?target=&lt;uag-host&gt;</code></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
