//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Resolve the site user model
//! - Initialize logging and metrics
//! - Start the config watcher, the admin listener and the public listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin::setup_admin_router;
use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, ConfigError};
use crate::http::HttpServer;
use crate::lifecycle::signals::shutdown_on_signal;
use crate::lifecycle::Shutdown;
use crate::observability::{logging::init_logging, metrics::init_metrics};
use crate::permissions::{PermissionError, SiteUserModel};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    SiteUserModel(#[from] PermissionError),

    #[error("Invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("Failed to watch config file: {0}")]
    Watch(#[from] notify::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, StartupError> {
    value.parse().map_err(|_| StartupError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

/// Run the site router with the configuration at `config_path` until a
/// shutdown signal arrives.
pub async fn start(config_path: &Path) -> Result<(), StartupError> {
    let config = load_config(config_path)?;
    init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "site-router starting");

    let model = SiteUserModel::resolve(&config.site_user_model)?;
    tracing::info!(
        app_label = %model.app_label,
        model = %model.model_name,
        "Site user model resolved"
    );

    let bind_addr = parse_addr("listener.bind_address", &config.listener.bind_address)?;

    if config.observability.metrics_enabled {
        let metrics_addr = parse_addr("observability.metrics_address", &config.observability.metrics_address)?;
        init_metrics(metrics_addr);
    }

    tracing::info!(
        path = ?config_path,
        sites = config.sites.len(),
        pages = config.pages.len(),
        i18n = config.i18n.enabled,
        "Configuration loaded"
    );

    let (watcher, config_updates) = ConfigWatcher::new(config_path);
    // dropping the handle stops the watch
    let _watch_handle = watcher.run()?;

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    let admin = config.admin.clone();
    let server = HttpServer::new(config);

    if admin.enabled {
        let admin_addr = parse_addr("admin.bind_address", &admin.bind_address)?;
        let admin_listener = TcpListener::bind(admin_addr).await?;
        let admin_router = setup_admin_router(server.state());
        let mut admin_shutdown = shutdown.subscribe();
        tracing::info!(address = %admin_addr, "Admin API listening");

        tokio::spawn(async move {
            let result = axum::serve(admin_listener, admin_router)
                .with_graceful_shutdown(async move {
                    let _ = admin_shutdown.recv().await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Admin API server failed");
            }
        });
    }

    let listener = TcpListener::bind(bind_addr).await?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
