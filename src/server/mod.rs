//! Web server exposing stored collection results.
//!
//! Serves the latest collector dataset as JSON and, in production mode, the
//! static frontend from the public directory.

mod handlers;
mod routes;

pub use routes::create_router;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Settings;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub data_dir: Arc<PathBuf>,
    pub dataset: Arc<str>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            data_dir: Arc::new(settings.data_dir.clone()),
            dataset: Arc::from(settings.dataset.as_str()),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let public_dir = if settings.production {
        tracing::info!("Serving static files from {}", settings.public_dir.display());
        Some(settings.public_dir.clone())
    } else {
        None
    };
    let app = create_router(state, public_dir);

    let listener = bind(host, port).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind a listener, resolving `host` when it is a name such as `localhost`.
async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((host, port)).await
}
