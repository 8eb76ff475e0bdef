//! VMware Horizon Prometheus Exporter
//!
//! Prometheus exporters for VMware Horizon connection servers and Unified
//! Access Gateways (UAG).
//!
//! # Overview
//!
//! Both exporters poll a management REST API on every scrape and map the
//! returned document onto Prometheus metrics through a declarative table of
//! metric descriptors. Nothing is cached between scrapes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   JSON (bearer)   ┌──────────────┐
//! │ Connection  │ ◄───────────────► │   Exporter   │
//! │   Server    │                   │              │
//! └─────────────┘                   │  ┌────────┐  │      HTTP      ┌────────────┐
//! ┌─────────────┐   XML (basic)     │  │ Client │  │ ◄────────────► │ Prometheus │
//! │     UAG     │ ◄───────────────► │  └────────┘  │   /metrics     └────────────┘
//! └─────────────┘                   │  ┌────────┐  │
//!                                   │  │Mapping │  │
//!                                   │  └────────┘  │
//!                                   └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`horizon`] - REST clients, token session, XML decoding
//! - [`mapping`] - Path resolution and descriptor evaluation
//! - [`collectors`] - Metric tables and per-scrape collection
//! - [`metrics`] - Prometheus text rendering
//! - [`server`] - HTTP servers for both exporters
//! - [`cli`] - Command line arguments
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use horizon_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start_connection_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod collectors;
pub mod config;
pub mod error;
pub mod horizon;
pub mod mapping;
pub mod metrics;
pub mod server;
