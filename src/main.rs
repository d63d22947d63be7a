//! Application entry point
//!
//! Loads configuration, opens the store, prepares the catalog and serves
//! the API until SIGINT or SIGTERM.

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use boostdesk::bootstrap::bootstrap;
use boostdesk::config::Config;
use boostdesk::database::{AppState, RedbStore};
use boostdesk::route::create_app;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boostdesk=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    let store = RedbStore::open(&config.database_url)?;
    let state = AppState::new(Arc::new(store));

    let report = bootstrap(&state.catalog, config.essential_platforms.as_slice())?;
    tracing::info!(?report, "Bootstrap finished");

    let app = create_app(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server running at http://localhost:{}", config.port);
    tracing::info!("Using database: {}", config.database_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server");
}
