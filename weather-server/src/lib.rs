//! HTTP backend for the weather map.
//!
//! Wires the core library into an axum router. The binary in `main.rs`
//! only parses the command line, sets up tracing and calls [`serve`].

pub mod error;
pub mod routes;

use anyhow::{Context, Result};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use weather_core::{Config, RequestLogStore, WeatherService, provider::provider_from_config};

pub use error::{ApiError, ErrorBody};
pub use routes::{AppState, WeatherResponse, create_router};

/// Build the per-process context: Open-Meteo client plus the request log.
pub fn build_state(config: &Config) -> Result<AppState> {
    let provider = provider_from_config(&config.provider)?;
    let store = RequestLogStore::open(&config.database.path).with_context(|| {
        format!("Failed to open request log database: {}", config.database.path.display())
    })?;
    info!(path = %config.database.path.display(), "Request log ready");

    Ok(AppState::new(WeatherService::new(Arc::from(provider), Arc::new(store))))
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}
