//! WebSocket connection handlers.
//!
//! Each socket gets a connection id and a per-connection [`ConnectionContext`]
//! holding the joined room, its session token and the navigation hint.
//! Frames from one socket are handled one at a time, so a sender's messages
//! keep their order.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{
        AccessError, ConnectionId, ConnectionIdFactory, PushFrame, PusherChannel, RoomId,
        TokenValue,
    },
    infrastructure::dto::websocket::{ClientMessage, LeaveReasonDto, ServerMessage},
    ui::state::AppState,
    usecase::{EndRoomError, JoinRoomError, JoinRoomInput, LeaveReason},
};

/// The room a connection has joined.
#[derive(Debug, Clone)]
struct JoinedSession {
    room_id: RoomId,
    token: TokenValue,
}

/// Session context of one WebSocket connection.
#[derive(Debug, Default)]
struct ConnectionContext {
    joined: Option<JoinedSession>,
    /// Room of a join that has started but not yet returned.
    joining: Option<RoomId>,
    /// Set by `navigating`: the next transport drop is an in-app navigation.
    navigating: bool,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the connection's queue into the WebSocket.
///
/// A [`PushFrame::Close`] closes the socket and ends the task.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<PushFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                PushFrame::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                PushFrame::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_client(connection_id.clone(), tx.clone())
        .await;
    tracing::info!("Connection '{}' opened", connection_id);

    let (sender, mut receiver) = socket.split();
    let context = Arc::new(Mutex::new(ConnectionContext::default()));

    // Spawn a task to receive frames from this client
    let mut recv_task = {
        let state = state.clone();
        let connection_id = connection_id.clone();
        let context = context.clone();
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
                    Message::Text(text) => {
                        let mut context = context.lock().await;
                        handle_text(&state, &connection_id, &tx, &mut context, text.as_str())
                            .await;
                    }
                    Message::Close(_) => {
                        tracing::info!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    _ => {}
                }
            }
        })
    };

    // Spawn a task to push queued events to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Taking the lock waits for an aborted frame handler to be dropped.
    let context = context.lock().await;
    if let Some(room_id) = context.departure_room() {
        let reason = LeaveReason::Disconnect {
            navigating: context.navigating,
        };
        if let Err(e) = state
            .leave_room_usecase
            .execute(&connection_id, &room_id, reason)
            .await
        {
            tracing::debug!("No departure to hold for '{}': {}", connection_id, e);
        }
    }
    state.message_pusher.unregister_client(&connection_id).await;
    tracing::info!("Connection '{}' closed", connection_id);
}

impl ConnectionContext {
    /// Room whose slot must be held when the transport drops.
    ///
    /// A join cut off midway may already have admitted the connection, so its
    /// room counts too; holding a slot that was never taken is a no-op.
    fn departure_room(&self) -> Option<RoomId> {
        self.joined
            .as_ref()
            .map(|joined| joined.room_id.clone())
            .or_else(|| self.joining.clone())
    }
}

fn send_error(tx: &PusherChannel, message: impl Into<String>) {
    let frame = ServerMessage::Error {
        message: message.into(),
    };
    match serde_json::to_string(&frame) {
        Ok(json) => {
            let _ = tx.send(PushFrame::Text(json));
        }
        Err(e) => tracing::error!("Failed to encode error frame: {}", e),
    }
}

/// The joined room, if `room_id` names it; otherwise reply with an error.
fn joined_room(context: &ConnectionContext, tx: &PusherChannel, room_id: &str) -> Option<RoomId> {
    match &context.joined {
        Some(joined) if joined.room_id.as_str() == room_id => Some(joined.room_id.clone()),
        Some(joined) => {
            send_error(
                tx,
                format!(
                    "this connection is in room '{}', not '{}'",
                    joined.room_id, room_id
                ),
            );
            None
        }
        None => {
            send_error(tx, "join a room first");
            None
        }
    }
}

async fn handle_text(
    state: &AppState,
    connection_id: &ConnectionId,
    tx: &PusherChannel,
    context: &mut ConnectionContext,
    text: &str,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", connection_id, e);
            send_error(tx, format!("malformed message: {}", e));
            return;
        }
    };
    tracing::debug!("Received {:?} from '{}'", message, connection_id);

    match message {
        ClientMessage::Join {
            room_id,
            token,
            name,
        } => {
            if let Some(joined) = &context.joined {
                send_error(tx, format!("already joined room '{}'", joined.room_id));
                return;
            }
            context.joining = RoomId::new(room_id.clone()).ok();
            let input = JoinRoomInput {
                connection_id: connection_id.clone(),
                room_id,
                token,
                name,
            };
            let result = state.join_room_usecase.execute(input).await;
            context.joining = None;
            match result {
                Ok(joined) => {
                    context.joined = Some(JoinedSession {
                        room_id: joined.room_id,
                        token: joined.session.token,
                    });
                    context.navigating = false;
                }
                // access_rejected has been sent
                Err(JoinRoomError::Access(_)) => {}
                Err(e) => send_error(tx, e.to_string()),
            }
        }
        ClientMessage::Leave { room_id, reason } => {
            let Some(room_id) = joined_room(context, tx, &room_id) else {
                return;
            };
            let reason = match reason {
                LeaveReasonDto::Intentional => LeaveReason::Intentional,
                LeaveReasonDto::Disconnect => LeaveReason::Disconnect {
                    navigating: context.navigating,
                },
            };
            if let Err(e) = state
                .leave_room_usecase
                .execute(connection_id, &room_id, reason)
                .await
            {
                send_error(tx, e.to_string());
            }
            context.joined = None;
            context.navigating = false;
        }
        ClientMessage::Navigating { room_id } => {
            if joined_room(context, tx, &room_id).is_some() {
                context.navigating = true;
            }
        }
        ClientMessage::SendMessage {
            room_id,
            message_id,
            text,
        } => {
            let Some(room_id) = joined_room(context, tx, &room_id) else {
                return;
            };
            if let Err(e) = state
                .send_message_usecase
                .execute(connection_id, &room_id, message_id, text)
                .await
            {
                send_error(tx, e.to_string());
            }
        }
        ClientMessage::PlaybackCommand {
            room_id,
            action,
            time,
            video_id,
        } => {
            let Some(room_id) = joined_room(context, tx, &room_id) else {
                return;
            };
            if let Err(e) = state
                .playback_command_usecase
                .execute(connection_id, &room_id, action.into(), time, video_id)
                .await
            {
                send_error(tx, e.to_string());
            }
        }
        ClientMessage::SyncRequest { room_id } => {
            let Some(room_id) = joined_room(context, tx, &room_id) else {
                return;
            };
            if let Err(e) = state
                .sync_request_usecase
                .execute(connection_id, &room_id)
                .await
            {
                send_error(tx, e.to_string());
            }
        }
        ClientMessage::EndRoom { room_id } => {
            let Some(room_id) = joined_room(context, tx, &room_id) else {
                return;
            };
            let token = context
                .joined
                .as_ref()
                .map(|joined| joined.token.clone());
            let Some(token) = token else {
                return;
            };
            match state
                .end_room_usecase
                .execute(connection_id, &room_id, token.as_str())
                .await
            {
                Ok(_) | Err(EndRoomError::Access(AccessError::Expired)) => {
                    context.joined = None;
                }
                // access_rejected has been sent
                Err(EndRoomError::Access(_)) => {}
                Err(e) => {
                    tracing::error!("Failed to end room '{}': {}", room_id, e);
                    send_error(tx, e.to_string());
                }
            }
        }
    }
}
