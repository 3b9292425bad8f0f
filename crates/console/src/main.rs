//! `rigel-console` -- terminal subscriber for the Rigel push channel.
//!
//! Streams telemetry and alerts from the server, falling back to a local
//! simulation when the server is unreachable. Alerts are kept in a bounded
//! JSON history file.

use rigel_console::config::ConsoleConfig;
use rigel_console::history::AlertHistory;
use rigel_console::link::Link;
use rigel_console::sink::ConsoleSink;
use rigel_core::config::EngineConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rigel_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ConsoleConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid console configuration");
        std::process::exit(1);
    });

    tracing::info!(
        ws_url = %config.ws_url,
        history = %config.history_path.display(),
        "Starting rigel-console",
    );

    let history = AlertHistory::load(&config.history_path, config.history_capacity);
    let mut sink = ConsoleSink::new(history);

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received SIGINT (Ctrl-C), stopping");
                ctrl_c_cancel.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install Ctrl-C handler"),
        }
    });

    let link = Link::new(config.ws_url, EngineConfig::default(), config.tick_interval);
    if let Err(e) = link.run(&mut sink, cancel).await {
        tracing::error!(error = %e, "Local simulation could not start");
        std::process::exit(1);
    }

    tracing::info!(alerts = sink.history().len(), "rigel-console stopped");
}
