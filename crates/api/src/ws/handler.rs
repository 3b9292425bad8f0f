use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use rigel_core::protocol::{ClientMessage, ServerMessage, SubscriptionState};
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::ws::manager::encode;

/// GET /api/v1/ws -- upgrade to the push channel.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one subscription after upgrade.
///
///   1. Snapshot the engine and register, both under the engine lock.
///   2. Spawn a send task draining the subscriber queue into the socket.
///   3. Process inbound command frames on the current task.
///   4. Unsubscribe and abort the send task on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();

    let mut rx = match register(&state, &conn_id).await {
        Ok(rx) => rx,
        Err(e) => {
            tracing::error!(conn_id = %conn_id, error = %e, "Failed to encode init frame");
            return;
        }
    };
    tracing::info!(conn_id = %conn_id, "Push-channel subscriber connected");

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let mut final_state = SubscriptionState::Disconnected;
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => handle_text(&state, &conn_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                final_state = SubscriptionState::Error;
                break;
            }
        }
    }

    state.subscriptions.unsubscribe(&conn_id, final_state).await;
    send_task.abort();
}

/// Build the `init` frame and register the subscriber while holding the
/// engine lock, so no tick can land between snapshot and registration.
async fn register(
    state: &AppState,
    conn_id: &str,
) -> Result<mpsc::UnboundedReceiver<Message>, serde_json::Error> {
    let engine = state.engine.lock().await;
    let snapshot = engine.init_snapshot(state.config.recent_alerts_on_init);
    let init = encode(&ServerMessage::Init(snapshot))?;
    let rx = state
        .subscriptions
        .subscribe(conn_id.to_string(), init, engine.ticks())
        .await;
    Ok(rx)
}

/// Apply one inbound frame. Malformed frames are logged and dropped; the
/// subscription stays open.
async fn handle_text(state: &AppState, conn_id: &str, text: &str) {
    let command = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Command(command)) => command,
        Err(e) => {
            tracing::warn!(conn_id = %conn_id, error = %e, "Ignoring malformed push-channel frame");
            return;
        }
    };

    let ack = state.engine.lock().await.apply_command(&command);
    tracing::info!(
        conn_id = %conn_id,
        command = %ack.command,
        applied = ack.applied,
        "Command processed"
    );

    match encode(&ServerMessage::Ack(ack)) {
        Ok(frame) => {
            state.subscriptions.send_to(conn_id, frame).await;
        }
        Err(e) => tracing::error!(conn_id = %conn_id, error = %e, "Failed to encode ack frame"),
    }
}
