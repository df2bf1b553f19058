//! Client execution logic with reconnection support.

use std::{sync::Arc, time::Duration};

use codepair_server::infrastructure::dto::http::{
    CreateRoomRequest, CreateRoomResponse, ErrorResponse,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{reconnect_delay, should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    follower::SimulatedPlayer,
    session::{SessionContext, run_client_session},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_BASE_DELAY: Duration = Duration::from_millis(500);
const RECONNECT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Which room to enter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomTarget {
    /// Create a room as `creator_identity`, then join it
    Create { creator_identity: String },
    /// Join an existing room, optionally presenting a token
    Join {
        room_id: String,
        token: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// HTTP base URL of the server, e.g. `http://127.0.0.1:8080`
    pub server: String,
    pub name: String,
    pub target: RoomTarget,
}

/// WebSocket endpoint for an HTTP base URL.
pub fn websocket_url(server: &str) -> String {
    let base = server.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/ws", base)
}

async fn create_room(server: &str, creator_identity: String) -> Result<CreateRoomResponse, ClientError> {
    let url = format!("{}/api/rooms", server.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .post(&url)
        .json(&CreateRoomRequest { creator_identity })
        .send()
        .await
        .map_err(|e| ClientError::HttpError(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let detail = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| status.to_string());
        return Err(ClientError::HttpError(format!("{}: {}", status, detail)));
    }

    response
        .json::<CreateRoomResponse>()
        .await
        .map_err(|e| ClientError::HttpError(e.to_string()))
}

/// Read stdin lines on a blocking thread and forward them.
fn spawn_readline(name: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", name);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Run the client with reconnection logic
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let (room_id, token) = match config.target {
        RoomTarget::Create { creator_identity } => {
            let created = create_room(&config.server, creator_identity).await?;
            println!(
                "\nRoom created: {}\nCreator token (keep it private): {}\nValid until {}\n",
                created.room_id, created.token, created.expires_at
            );
            (created.room_id, Some(created.token))
        }
        RoomTarget::Join { room_id, token } => (room_id, token),
    };

    let url = websocket_url(&config.server);
    let context = SessionContext {
        room_id,
        name: config.name.clone(),
        token: Arc::new(Mutex::new(token)),
        player: Arc::new(SimulatedPlayer::new()),
    };
    let mut input_rx = spawn_readline(config.name);
    let mut reconnect_count = 0;

    println!("Type messages and press Enter to send. /help lists commands.\n");

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            context.name,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        let e = match run_client_session(&url, &context, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                // If the user left, don't reconnect
                return Ok(());
            }
            Err(e) => e,
        };

        if let ClientError::RoomEnded { .. } = e {
            return Ok(());
        }
        if should_exit_immediately(&e) {
            tracing::error!("{}. Exiting.", e);
            return Err(e);
        }

        tracing::warn!("Connection lost: {}", e);
        reconnect_count += 1;

        if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
            tracing::error!(
                "Failed to reconnect after {} attempts. Exiting.",
                MAX_RECONNECT_ATTEMPTS
            );
            return Err(e);
        }

        let delay = reconnect_delay(reconnect_count, RECONNECT_BASE_DELAY, RECONNECT_MAX_DELAY);
        tracing::info!(
            "Reconnecting in {:?}... (attempt {}/{})",
            delay,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url_from_http_base() {
        // テスト項目: HTTP のベース URL から WebSocket のエンドポイントが組み立てられる
        // given (前提条件):
        let servers = ["http://127.0.0.1:8080", "https://rooms.example.com/"];

        // when (操作):
        let urls: Vec<String> = servers.iter().map(|s| websocket_url(s)).collect();

        // then (期待する結果):
        assert_eq!(
            urls,
            vec!["ws://127.0.0.1:8080/ws", "wss://rooms.example.com/ws"]
        );
    }
}
