use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signal_board::api::{build_router, AppState};
use signal_board::config::Config;
use signal_board::jobs::expiry_sweeper;
use signal_board::store::CardStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signal_board=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Signal Board server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let store = CardStore::new();

    match config.sweep_interval() {
        Some(interval) => {
            expiry_sweeper::spawn(store.clone(), interval);
            tracing::info!(interval_secs = interval.as_secs(), "Expiry sweeper started");
        }
        None => tracing::info!("Expiry sweeper disabled, expired cards are only hidden"),
    }

    // Build application state
    let state = AppState::new(store)?;
    let app = build_router(state);

    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, cleaning up...");
}
