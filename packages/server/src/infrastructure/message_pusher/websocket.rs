//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `PusherChannel` を管理
//! - `RoomEvent` を JSON にエンコードして送信キューへ積む
//!
//! WebSocket 自体の生成と書き込みは UI 層（`ui/handler/websocket.rs`）が担当し、
//! この実装はキューへの投入のみを行います。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, PushFrame, PusherChannel, RoomEvent},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中クライアントの送信キュー
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 登録済みクライアント数
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    fn encode(event: &RoomEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerMessage::from(event.clone()))
            .map_err(|e| MessagePushError::Encode(e.to_string()))
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!("Client '{}' unregistered from MessagePusher", connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let payload = Self::encode(event)?;
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(connection_id) {
            sender
                .send(PushFrame::Text(payload))
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed '{}' to client '{}'", event.name(), connection_id);
            Ok(())
        } else {
            Err(MessagePushError::ClientNotFound(
                connection_id.as_str().to_string(),
            ))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let payload = Self::encode(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            if let Some(sender) = clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = sender.send(PushFrame::Text(payload.clone())) {
                    tracing::warn!("Failed to push '{}' to client '{}': {}", event.name(), target, e);
                } else {
                    tracing::debug!("Broadcasted '{}' to client '{}'", event.name(), target);
                }
            } else {
                tracing::warn!("Client '{}' not found during broadcast, skipping", target);
            }
        }

        Ok(())
    }

    async fn disconnect(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if let Some(sender) = clients.remove(connection_id) {
            // 受信側が既に閉じていれば何もしない
            let _ = sender.send(PushFrame::Close);
            tracing::debug!("Client '{}' disconnected by server", connection_id);
        }
    }
}
