//! Push-channel client with local fallback.
//!
//! Connects to the server once. Frames from a live session go straight to
//! the [`FrameSink`]; if the connection cannot be established, or the
//! session drops, the link switches to a [`Fallback`] engine feeding the
//! same sink until cancelled. There is no reconnect.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rigel_core::config::EngineConfig;
use rigel_core::error::CoreError;
use rigel_core::protocol::ServerMessage;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::fallback::Fallback;
use crate::sink::{FrameSink, LinkMode};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How a live session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Cancelled,
    Dropped,
}

pub struct Link {
    url: String,
    engine_config: EngineConfig,
    tick_interval: Duration,
}

impl Link {
    pub fn new(
        url: impl Into<String>,
        engine_config: EngineConfig,
        tick_interval: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            engine_config,
            tick_interval,
        }
    }

    /// Run until `cancel` fires.
    ///
    /// Only fails if the fallback engine configuration is invalid.
    pub async fn run<S: FrameSink>(
        &self,
        sink: &mut S,
        cancel: CancellationToken,
    ) -> Result<(), CoreError> {
        tracing::info!(url = %self.url, "Connecting to push channel");

        let connect = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            result = connect_async(self.url.as_str()) => result,
        };

        match connect {
            Ok((ws_stream, _response)) => {
                sink.mode_changed(LinkMode::Live);
                if run_session(ws_stream, sink, &cancel).await == SessionEnd::Cancelled {
                    return Ok(());
                }
                tracing::warn!("Push channel dropped, switching to local simulation");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Push channel unavailable, switching to local simulation"
                );
            }
        }

        let fallback = Fallback::new(self.engine_config.clone(), self.tick_interval)?;
        sink.mode_changed(LinkMode::Fallback);
        fallback.run(sink, cancel).await;
        Ok(())
    }
}

async fn run_session<S: FrameSink>(
    ws_stream: WsStream,
    sink: &mut S,
    cancel: &CancellationToken,
) -> SessionEnd {
    let (mut ws_sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = ws_sink.send(Message::Close(None)).await;
                return SessionEnd::Cancelled;
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerMessage>(&text) {
                            Ok(frame) => sink.deliver(frame),
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    "Unknown or malformed push-channel frame"
                                );
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Server closed push channel");
                        return SessionEnd::Dropped;
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong handled by tungstenite; binary ignored.
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Push channel receive error");
                        return SessionEnd::Dropped;
                    }
                    None => {
                        tracing::info!("Push channel stream exhausted");
                        return SessionEnd::Dropped;
                    }
                }
            }
        }
    }
}
