//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::conversion::parse_client_command,
    ui::state::AppState,
    usecase::SessionHandle,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// The loop ends when the coordinator drops the sender (connection unregistered)
/// or the socket stops accepting frames.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Reads frames from the socket and forwards them to the coordinator as commands.
fn receiver_loop(
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    session: SessionHandle,
    connection_id: ConnectionId,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match parse_client_command(text.as_str()) {
                    Ok(command) => {
                        tracing::trace!("Received {:?} from '{}'", command, connection_id);
                        if let Err(e) = session.client(connection_id.clone(), command) {
                            tracing::error!("Cannot forward command: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Dropped frame from '{}': {}", connection_id, e);
                    }
                },
                Message::Ping(_) => {
                    tracing::trace!("Received ping from '{}'", connection_id);
                }
                Message::Close(_) => {
                    tracing::debug!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();

    // Create a channel for this connection to receive frames
    let (tx, rx) = mpsc::unbounded_channel();
    if let Err(e) = state.session.connect(connection_id.clone(), tx) {
        tracing::error!("Rejected connection '{}': {}", connection_id, e);
        return;
    }

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = receiver_loop(receiver, state.session.clone(), connection_id.clone());

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state.session.disconnect(connection_id.clone()) {
        tracing::warn!("Failed to report disconnect of '{}': {}", connection_id, e);
    }
}
