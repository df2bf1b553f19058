//! WebSocket client session management.
//!
//! One session is one WebSocket connection: join the room, then run a read
//! task (server events, playback follower) against the input loop until
//! either side ends.

use std::sync::Arc;

use codepair_server::infrastructure::dto::websocket::{
    ClientMessage, LeaveReasonDto, RejectReasonDto, ServerMessage,
};
use codepair_shared::time::SystemClock;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{
    net::TcpStream,
    sync::{Mutex, mpsc},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::{
    command::{HELP, InputCommand, parse_input},
    error::ClientError,
    follower::{ConvergenceConfig, PlaybackFollower, SyncGuard, VideoPlayer},
    formatter::MessageFormatter,
    ui::show,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a session needs to (re)join its room.
#[derive(Clone)]
pub struct SessionContext {
    pub room_id: String,
    pub name: String,
    /// Latest session token; filled by `session_issued` and reused on reconnect
    pub token: Arc<Mutex<Option<String>>>,
    /// Shared across sessions so the local position survives a reconnect
    pub player: Arc<dyn VideoPlayer>,
}

/// Run one WebSocket session.
///
/// Returns `Ok(())` when the user leaves. Errors tell the runner whether to
/// reconnect.
pub async fn run_client_session(
    url: &str,
    context: &SessionContext,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    tracing::info!("Connected to {}", url);

    let (mut write, read) = ws_stream.split();

    let join = ClientMessage::Join {
        room_id: context.room_id.clone(),
        token: context.token.lock().await.clone(),
        name: context.name.clone(),
    };
    send(&mut write, &join).await?;

    let guard = Arc::new(SyncGuard::new());
    let follower = PlaybackFollower::new(
        context.player.clone(),
        guard.clone(),
        Arc::new(SystemClock),
        ConvergenceConfig::default(),
    );

    // Spawn a task to handle incoming messages
    let mut read_task = tokio::spawn(read_loop(read, context.clone(), follower));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            match read_result {
                Ok(result) => result,
                Err(e) => Err(ClientError::ConnectionError(e.to_string())),
            }
        }
        write_result = write_loop(&mut write, input_rx, context, &guard) => {
            read_task.abort();
            let _ = write.send(Message::Close(None)).await;
            write_result
        }
    }
}

async fn send(
    write: &mut SplitSink<WsStream, Message>,
    message: &ClientMessage,
) -> Result<(), ClientError> {
    let json = serde_json::to_string(message)
        .map_err(|e| ClientError::ConnectionError(format!("failed to encode message: {}", e)))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}

/// Handle server events until the connection or the room ends.
async fn read_loop(
    mut read: SplitStream<WsStream>,
    context: SessionContext,
    mut follower: PlaybackFollower,
) -> Result<(), ClientError> {
    let name = context.name.as_str();
    let mut my_connection_id: Option<String> = None;

    while let Some(message) = read.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                tracing::info!("Server closed the connection");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("WebSocket read error: {}", e);
                break;
            }
        };

        let event = match serde_json::from_str::<ServerMessage>(text.as_str()) {
            Ok(event) => event,
            Err(_) => {
                show(&MessageFormatter::format_raw_message(text.as_str()), name);
                continue;
            }
        };

        match event {
            ServerMessage::SessionIssued {
                token,
                role,
                connection_id,
                expires_at,
                ..
            } => {
                *context.token.lock().await = Some(token);
                my_connection_id = Some(connection_id);
                show(&MessageFormatter::format_session_issued(role, expires_at), name);
            }
            ServerMessage::ParticipantsUpdated { participants, .. } => {
                show(
                    &MessageFormatter::format_participants(
                        &participants,
                        my_connection_id.as_deref(),
                    ),
                    name,
                );
            }
            ServerMessage::MessageDelivered { message, .. } => {
                show(&MessageFormatter::format_chat_message(&message), name);
            }
            ServerMessage::MessageAcked { message_id, .. } => {
                show(&MessageFormatter::format_acked(&message_id), name);
            }
            ServerMessage::MessageHistory { messages, .. } => {
                if !messages.is_empty() {
                    show(&MessageFormatter::format_history(&messages), name);
                }
            }
            ServerMessage::PlaybackStateChanged {
                state,
                authoritative,
                issued_by,
                ..
            } => {
                follower.apply(&state, authoritative).await;
                show(
                    &MessageFormatter::format_playback(
                        &state,
                        authoritative,
                        issued_by.as_deref(),
                    ),
                    name,
                );
            }
            ServerMessage::RoomEnded {
                room_id,
                ended_by_name,
            } => {
                show(&MessageFormatter::format_room_ended(&ended_by_name), name);
                return Err(ClientError::RoomEnded {
                    room_id,
                    ended_by: ended_by_name,
                });
            }
            ServerMessage::AccessRejected {
                room_id,
                reason,
                detail,
                ..
            } => {
                show(
                    &MessageFormatter::format_access_rejected(reason, &detail),
                    name,
                );
                // An unauthorized action does not end the session.
                if reason != RejectReasonDto::Rejected {
                    return Err(ClientError::AccessRejected {
                        room_id,
                        reason,
                        detail,
                    });
                }
            }
            ServerMessage::Error { message } => {
                show(&MessageFormatter::format_error(&message), name);
            }
        }
    }

    Err(ClientError::ConnectionError("Connection lost".to_string()))
}

/// Turn typed lines into client messages until the user leaves.
async fn write_loop(
    write: &mut SplitSink<WsStream, Message>,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
    context: &SessionContext,
    guard: &SyncGuard,
) -> Result<(), ClientError> {
    let room_id = context.room_id.clone();
    let name = context.name.as_str();

    while let Some(line) = input_rx.recv().await {
        let message = match parse_input(&line) {
            InputCommand::Chat(text) => ClientMessage::SendMessage {
                room_id: room_id.clone(),
                message_id: uuid::Uuid::new_v4().to_string(),
                text,
            },
            InputCommand::Playback {
                action,
                time,
                video_id,
            } => {
                if !guard.allows_local_events() {
                    show(
                        &MessageFormatter::format_error(
                            "sync in progress, playback command suppressed",
                        ),
                        name,
                    );
                    continue;
                }
                let time = match time {
                    Some(time) => time,
                    None => context.player.position().await,
                };
                ClientMessage::PlaybackCommand {
                    room_id: room_id.clone(),
                    action,
                    time,
                    video_id: video_id.or(context.player.video_id().await),
                }
            }
            InputCommand::Sync => ClientMessage::SyncRequest {
                room_id: room_id.clone(),
            },
            InputCommand::Navigate => ClientMessage::Navigating {
                room_id: room_id.clone(),
            },
            InputCommand::End => ClientMessage::EndRoom {
                room_id: room_id.clone(),
            },
            InputCommand::Leave => {
                let leave = ClientMessage::Leave {
                    room_id: room_id.clone(),
                    reason: LeaveReasonDto::Intentional,
                };
                send(write, &leave).await?;
                return Ok(());
            }
            InputCommand::Help => {
                show(HELP, name);
                continue;
            }
            InputCommand::Invalid(reason) => {
                show(&MessageFormatter::format_error(&reason), name);
                continue;
            }
        };

        send(write, &message).await?;
    }

    // Input closed (Ctrl+C / Ctrl+D)
    let leave = ClientMessage::Leave {
        room_id,
        reason: LeaveReasonDto::Intentional,
    };
    send(write, &leave).await?;
    Ok(())
}
