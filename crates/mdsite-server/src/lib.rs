//! HTTP server for mdsite.
//!
//! This crate provides an axum HTTP server serving:
//! - content pages resolved from the content directory (any unrouted path)
//! - `GET /toc`, the table of contents rendered with the TOC template
//! - `POST /api/reindex`, which rebuilds the site index
//! - `GET /ping`, a liveness probe
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use mdsite_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 8080,
//!         content_dir: PathBuf::from("site"),
//!         config_dir: PathBuf::from("config"),
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use mdsite_config::SiteSettings;
use mdsite_site::{Site, SiteContext};
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Root of the content tree.
    pub content_dir: PathBuf,
    /// Directory holding `site.yml`, `order.yml` and templates.
    pub config_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            content_dir: PathBuf::from("site"),
            config_dir: PathBuf::from("config"),
        }
    }
}

/// Run the server.
///
/// Site settings are loaded and the index is built before the listener is
/// bound; failures there are returned without serving anything.
///
/// # Errors
///
/// Returns an error if the settings or the initial index cannot be built, or
/// if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let settings = SiteSettings::load_or_builtin(&config.config_dir)?;

    let site = Site::new(SiteContext::new(
        config.content_dir.clone(),
        config.config_dir.clone(),
    ));
    let index = site.index()?;
    tracing::info!(
        pages = index.len(),
        content_dir = %config.content_dir.display(),
        "Site index ready"
    );

    let state = Arc::new(AppState::new(site, settings));
    let app = app::create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "Starting server");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from mdsite config.
#[must_use]
pub fn server_config_from_config(config: &mdsite_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        content_dir: config.site_resolved.content_dir.clone(),
        config_dir: config.site_resolved.config_dir.clone(),
    }
}
