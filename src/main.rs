use anyhow::Result;
use clap::Parser;
use horizon_exporter::cli::{Args, Exporter};
use horizon_exporter::{config::Config, server};
use secrecy::SecretString;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn secret(value: String) -> SecretString {
    SecretString::new(value.into())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Horizon Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(port) = args.port {
        config.server.port = Some(port);
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }

    let result = match args.exporter {
        Exporter::ConnectionServer {
            url,
            domain,
            username,
            password,
        } => {
            let cs = &mut config.connection_server;
            cs.url = url.or(cs.url.take());
            cs.domain = domain.or(cs.domain.take());
            cs.username = username.or(cs.username.take());
            cs.password = password.map(secret).or(cs.password.take());

            info!("Configuration loaded successfully");
            server::start_connection_server(config).await
        }
        Exporter::Uag { username, password } => {
            let uag = &mut config.uag;
            uag.username = username.or(uag.username.take());
            uag.password = password.map(secret).or(uag.password.take());

            info!("Configuration loaded successfully");
            server::start_uag(config).await
        }
    };

    // Missing configuration ends up here as well
    if let Err(e) = result {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
