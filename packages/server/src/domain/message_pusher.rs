//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのイベント送信（通知）を抽象化します。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, event::RoomEvent, value_object::ConnectionId};

/// 接続ごとの送信キューに流れるフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushFrame {
    /// エンコード済みのイベント
    Text(String),
    /// 送信後に接続を閉じる
    Close,
}

/// クライアントへのフレーム送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<PushFrame>;

/// MessagePusher trait
///
/// `broadcast` は一部の送信失敗を許容します（切断済みの接続はスキップ）。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントにイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントにイベントを送信
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// クライアントの接続を閉じ、登録解除する
    async fn disconnect(&self, connection_id: &ConnectionId);
}
