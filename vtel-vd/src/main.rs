//! Vehicle Data service (vtel-vd) - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vtel_common::config::{load_toml_config, TomlConfig};
use vtel_common::db::init_database;
use vtel_vd::config::{CliArgs, ServiceConfig};
use vtel_vd::store::RecordStore;
use vtel_vd::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config_path = args.config_path();
    let file_config = match &config_path {
        Some(path) => load_toml_config(path).context("Failed to load config file")?,
        None => None,
    };
    let file_found = file_config.is_some();
    let config = ServiceConfig::resolve(&args, file_config.unwrap_or_else(TomlConfig::default));

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "vtel_vd={level},vtel_common={level},tower_http={level}",
                level = config.log_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vtel-vd (Vehicle Data) v{}", env!("CARGO_PKG_VERSION"));

    match (&config_path, file_found) {
        (Some(path), true) => info!("Config file: {}", path.display()),
        (Some(path), false) => warn!("Config file {} not found, using defaults", path.display()),
        (None, _) => warn!("No config directory available, using defaults"),
    }

    info!("Database: {}", config.database_path.display());
    info!("Data directory: {}", config.data_path.display());
    info!("Exports directory: {}", config.exports_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let store = RecordStore::new(pool);
    let state = AppState::new(store.clone(), &config.data_path, &config.exports_path);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_address()))?;
    info!("✓ Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.pool().close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
