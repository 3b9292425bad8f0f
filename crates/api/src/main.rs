use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rigel_api::background::BackgroundTasks;
use rigel_api::config::ServerConfig;
use rigel_api::router::build_app_router;
use rigel_api::state::AppState;
use rigel_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rigel_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid server configuration");
            std::process::exit(1);
        }
    };
    let addr = match config.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "Invalid bind address");
            std::process::exit(1);
        }
    };
    tracing::info!(
        host = %config.host,
        port = config.port,
        tick_interval_ms = config.tick_interval.as_millis() as u64,
        location = %config.location,
        "Loaded server configuration"
    );

    // --- App state (engine, subscriptions, event bus) ---
    let state = match AppState::new(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Invalid engine configuration");
            std::process::exit(1);
        }
    };

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&state.subscriptions));

    // --- Tick scheduler and fan-out ---
    let cancel = CancellationToken::new();
    let background = BackgroundTasks::spawn(&state, cancel.clone());
    tracing::info!("Background services started (tick scheduler, subscriber fan-out)");

    let subscriptions = Arc::clone(&state.subscriptions);
    let app = build_app_router(state, &config);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    background.shutdown().await;

    let count = subscriptions.subscription_count().await;
    tracing::info!(count, "Closing remaining push-channel subscriptions");
    subscriptions.shutdown_all().await;

    heartbeat_handle.abort();
    let _ = tokio::time::timeout(Duration::from_secs(1), heartbeat_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
