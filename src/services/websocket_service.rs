use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::{ViewerInboundMessage, ViewerOutboundMessage},
    state::{SharedState, ViewerConnection, announcement::Announcement},
};

/// The writer side of a viewer socket is gone.
#[derive(Debug, Error)]
#[error("connection closed")]
pub struct ConnectionClosed;

/// Handle the full lifecycle for an individual viewer WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Single writer per socket keeps ranking pushes and announcements in order.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let viewer_id = Uuid::new_v4();
    if register_viewer(&state, viewer_id, &outbound_tx).await.is_err() {
        info!(id = %viewer_id, "viewer closed during registration");
        state.viewers().remove(&viewer_id);
        finalize(writer_task, outbound_tx).await;
        return;
    }
    info!(id = %viewer_id, viewers = state.viewers().len(), "viewer connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ViewerInboundMessage::from_json_str(&text) {
                Ok(ViewerInboundMessage::GetRanking) => {
                    let ranking = state.ranking_snapshot().await.items().to_vec();
                    let reply = ViewerOutboundMessage::InitialRanking { ranking };
                    if send_message_to_websocket(&outbound_tx, &reply).is_err() {
                        break;
                    }
                }
                Ok(ViewerInboundMessage::Unknown) => {
                    debug!(id = %viewer_id, payload = %text, "ignoring unknown viewer message");
                }
                Err(err) => {
                    warn!(id = %viewer_id, error = %err, "failed to parse viewer message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %viewer_id, "viewer closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %viewer_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.viewers().remove(&viewer_id);
    info!(id = %viewer_id, "viewer disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Register the socket and send it the current ranking, followed by the places
/// already revealed when replay is enabled.
///
/// Runs under the announcement gate and the ranking read lock so no
/// announcement or ranking replacement can slip in between.
async fn register_viewer(
    state: &SharedState,
    viewer_id: Uuid,
    tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), ConnectionClosed> {
    let _gate = state.announce_gate().lock().await;
    let ranking = state.read_ranking().await;

    state.viewers().insert(
        viewer_id,
        ViewerConnection {
            id: viewer_id,
            tx: tx.clone(),
        },
    );

    send_message_to_websocket(
        tx,
        &ViewerOutboundMessage::InitialRanking {
            ranking: ranking.items().to_vec(),
        },
    )?;

    if state.config().replay_reveals_on_connect() {
        for place in state.revealed_places().await {
            debug!(id = %viewer_id, %place, "replaying revealed place");
            send_message_to_websocket(
                tx,
                &ViewerOutboundMessage::announcement(Announcement::Reveal(place)),
            )?;
        }
    }
    Ok(())
}

/// Queue `message` on every connected viewer and return how many accepted it.
///
/// Viewers whose writer is gone are dropped from the registry.
pub fn fan_out(state: &SharedState, message: &ViewerOutboundMessage) -> usize {
    let payload = match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize viewer message `{message:?}`");
            return 0;
        }
    };

    let mut delivered = 0;
    let mut dead = Vec::new();
    for entry in state.viewers().iter() {
        if entry
            .tx
            .send(Message::Text(payload.clone().into()))
            .is_ok()
        {
            delivered += 1;
        } else {
            dead.push(entry.id);
        }
    }
    for id in dead {
        warn!(id = %id, "viewer writer closed, removing connection");
        state.viewers().remove(&id);
    }
    delivered
}

/// Serialize a payload and push it onto the provided WebSocket sender.
///
/// Serialization failures are logged and swallowed; only a closed writer is
/// reported to the caller.
pub fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), ConnectionClosed>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
