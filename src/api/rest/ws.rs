use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use futures::stream::SplitSink;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::AppState;
use crate::store::OrderSnapshot;

/// Live order feed: the full current order collection on connect and again
/// on every change. Consumers derive their views from the latest snapshot,
/// so a lagging client can safely skip intermediate states.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.store.subscribe();
    let initial = state.store.orders_snapshot();

    info!("order feed client connected");

    let send_task = tokio::spawn(async move {
        if send_snapshot(&mut sender, &initial).await.is_err() {
            return;
        }

        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    if send_snapshot(&mut sender, &snapshot).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // fine: the next snapshot supersedes everything missed
                    warn!(skipped, "order feed consumer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!("order feed client disconnected");
}

async fn send_snapshot(
    sender: &mut SplitSink<WebSocket, Message>,
    snapshot: &OrderSnapshot,
) -> Result<(), ()> {
    let json = match serde_json::to_string(snapshot.as_ref()) {
        Ok(json) => json,
        Err(err) => {
            warn!(error = %err, "failed to serialize order snapshot for ws");
            return Ok(());
        }
    };

    sender.send(Message::Text(json)).await.map_err(|_| ())
}
