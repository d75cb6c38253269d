//! HTTP surface over the occurrence store
//!
//! Routes:
//! - `GET /health`
//! - `GET /occurrences`: all records with count
//! - `GET /occurrences/{id}`: a single record
//! - `POST /upload`: multipart upload, field `file`
//! - `GET /metrics`: counts by severity and status

mod error;
mod handlers;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::services::OccurrenceStore;

pub use error::ApiError;

/// State shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: OccurrenceStore,
}

/// Build the application router
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/occurrences", get(handlers::list_occurrences))
        .route("/occurrences/{id}", get(handlers::get_occurrence))
        .route("/upload", post(handlers::upload))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Run the HTTP server until it is shut down
pub async fn serve(config: &Config) -> Result<()> {
    let store = OccurrenceStore::new(&config.data_dir, config.ingest_options()?)?;
    log::info!("Serving occurrences from {}", store.path().display());

    let app = router(AppState { store }, config.max_upload_bytes());

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

/// Resolves on ctrl-c. If the handler cannot be installed the server keeps
/// running until killed.
async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

async fn wait_for_signal<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => log::info!("Shutdown signal received"),
        Err(e) => {
            log::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
