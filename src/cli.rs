//! Command line interface
//!
//! Global flags (`--config`, `--port`, `--addr`) are accepted before or
//! after the exporter subcommand.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "horizon-exporter", author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml", global = true)]
    pub config: String,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT", global = true)]
    pub port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR", global = true)]
    pub addr: Option<String>,

    #[command(subcommand)]
    pub exporter: Exporter,
}

#[derive(Subcommand, Debug)]
pub enum Exporter {
    /// Export gateway and connection server metrics from a connection server
    ConnectionServer {
        /// Connection server base URL (overrides config)
        #[arg(long, env = "HORIZON_API_CONNECTION_URL")]
        url: Option<String>,

        /// Login domain (overrides config)
        #[arg(long, env = "HORIZON_API_CONNECTION_DOMAIN")]
        domain: Option<String>,

        /// Login username (overrides config)
        #[arg(long, env = "HORIZON_API_CONNECTION_USERNAME")]
        username: Option<String>,

        /// Login password (overrides config)
        #[arg(long, env = "HORIZON_API_CONNECTION_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Export Unified Access Gateway metrics for `/metrics?target=<host>`
    Uag {
        /// Admin API username (overrides config)
        #[arg(long, env = "HORIZON_API_GATEWAY_USERNAME")]
        username: Option<String>,

        /// Admin API password (overrides config)
        #[arg(long, env = "HORIZON_API_GATEWAY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}
