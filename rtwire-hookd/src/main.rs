//! RTWire webhook receiver.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p rtwire-hookd --release
//!
//! # Run with custom config path
//! CONFIG=/path/to/config.toml cargo run -p rtwire-hookd
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p rtwire-hookd
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `config.toml`)
//! - `HOST` - Override bind address (default: `0.0.0.0`)
//! - `PORT` - Override port (default: `4030`)
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use rtwire_http::HttpClient;
use tracing_subscriber::EnvFilter;

use rtwire_hookd::config::HookdConfig;
use rtwire_hookd::error::HookdError;
use rtwire_hookd::registration::{self, Registration};
use rtwire_hookd::{HookdState, hookd_router};

/// Receives RTWire transaction pushes and logs them.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Bind address, overriding the file.
    #[arg(long, env = "HOST")]
    host: Option<IpAddr>,

    /// Port, overriding the file.
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let args = Args::parse();
    if let Err(e) = run(args).await {
        tracing::error!("rtwire-hookd failed: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), HookdError> {
    let mut config = HookdConfig::load_from(&args.config)?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    tracing::info!(
        host = %config.host,
        port = config.port,
        path = %config.path,
        api = ?config.api,
        "Loaded configuration"
    );

    let client = match &config.public_url {
        Some(url) if config.api.has_unresolved_credentials() => {
            tracing::warn!(%url, "Skipping hook registration: API credentials not resolved (missing env var?)");
            None
        }
        Some(url) => {
            let client = HttpClient::new(config.api.client_config())?;
            let registration = registration::register(&client, url).await?;
            // Only remove what this process added.
            (registration == Registration::Created && config.unregister_on_shutdown)
                .then_some(client)
        }
        None => {
            tracing::info!("No public_url configured; not registering a hook");
            None
        }
    };

    let state = HookdState::default();
    let app = hookd_router(state, &config.path);

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening for pushes on http://{addr}{}", config.path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let (Some(client), Some(url)) = (client, &config.public_url) {
        if let Err(e) = registration::unregister(&client, url).await {
            tracing::warn!(%url, "Failed to unregister hook: {e}");
        }
    }

    tracing::info!("rtwire-hookd shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                ctrl_c.await;
                tracing::info!("Received Ctrl-C, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
