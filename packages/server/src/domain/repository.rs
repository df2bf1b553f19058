//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    entity::Room,
    error::RepositoryError,
    session::SessionToken,
    value_object::RoomId,
};

/// ルームごとの排他制御単位
///
/// 同一ルームへの操作はこの Mutex で直列化され、異なるルームは並行に処理されます。
pub type RoomHandle = Arc<Mutex<Room>>;

/// Room Repository trait
///
/// 稼働中ルームの索引と、終了済みルーム ID の記録を提供します。
/// 索引のロックはハンドルの取得・追加・削除の間だけ保持され、
/// ルーム自体のロックを取得する間は保持されません。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを登録（同一 ID の稼働中・終了済みルームがあればエラー）
    async fn insert(&self, room: Room) -> Result<RoomHandle, RepositoryError>;

    /// 稼働中のルームを取得
    async fn find(&self, room_id: &RoomId) -> Option<RoomHandle>;

    /// 稼働中ルームの一覧を取得
    async fn list(&self) -> Vec<RoomHandle>;

    /// ルームを終了済みとして記録し、索引から削除
    async fn mark_ended(&self, room_id: &RoomId) -> Result<(), RepositoryError>;

    /// 終了済みとして記録されているか
    async fn is_ended(&self, room_id: &RoomId) -> bool;

    /// 稼働中ルーム数を取得
    async fn count(&self) -> usize;
}

/// 終了済みルーム ID の記録（再起動後も終了状態を維持するため）
#[async_trait]
pub trait EndedRoomLedger: Send + Sync {
    async fn record(&self, room_id: &RoomId) -> Result<(), RepositoryError>;

    async fn contains(&self, room_id: &RoomId) -> bool;
}

/// Session Repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn save(&self, session: SessionToken) -> Result<(), RepositoryError>;

    async fn find(&self, token: &str) -> Option<SessionToken>;

    /// ルームに紐づく全トークンを削除し、削除件数を返す
    async fn remove_room(&self, room_id: &RoomId) -> usize;
}
