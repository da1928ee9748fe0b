//! voxcheck-vd - Synthetic Voice Detection microservice
//!
//! **Module Identity:**
//! - Name: voxcheck-vd (Voice Detection)
//! - Port: 5730 (default)
//!
//! Accepts MP3 audio (inline base64 or URL) and labels it `AI_GENERATED` or
//! `HUMAN` from pitch, energy, zero-crossing and spectral statistics.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voxcheck_common::config::{load_toml_config, resolve_config_path};
use voxcheck_vd::config::{
    AuthSettings, CliOverrides, ServiceConfig, TomlConfig, CONFIG_ENV_VAR, DEFAULT_LOG_FILTER, MODULE_NAME,
};
use voxcheck_vd::AppState;

/// Command-line arguments for voxcheck-vd
#[derive(Parser, Debug)]
#[command(name = "voxcheck-vd")]
#[command(about = "Synthetic voice detection microservice")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "VOXCHECK_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "VOXCHECK_BIND")]
    bind: Option<String>,

    /// Path to the TOML config file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so [logging] level can seed the
    // filter; load errors are reported after init.
    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR, MODULE_NAME);
    let toml_config = load_toml_config::<TomlConfig>(config_path.as_deref());

    let default_filter = toml_config
        .as_ref()
        .map_or(DEFAULT_LOG_FILTER, TomlConfig::log_filter)
        .to_string();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting voxcheck-vd (Voice Detection) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let toml_config = toml_config.context("Failed to load configuration file")?;
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    let cli = CliOverrides {
        port: args.port,
        bind_address: args.bind,
    };
    let config = ServiceConfig::resolve(&cli, &toml_config).context("Invalid configuration")?;

    match &config.auth {
        AuthSettings::ApiKey { header, .. } => info!("API key authentication on header '{}'", header),
        AuthSettings::Disabled => warn!("Running WITHOUT authentication"),
    }

    let state = AppState::from_config(&config).context("Failed to initialize service")?;
    let app = voxcheck_vd::build_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
