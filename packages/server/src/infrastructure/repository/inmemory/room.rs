//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! 稼働中ルームは HashMap で保持し、終了済みルームは EndedRoomLedger に委譲します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    EndedRoomLedger, RepositoryError, Room, RoomHandle, RoomId, RoomRepository,
};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// 稼働中ルームの索引
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    /// 終了済みルーム ID の記録
    ledger: Arc<dyn EndedRoomLedger>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(ledger: Arc<dyn EndedRoomLedger>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            ledger,
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert(&self, room: Room) -> Result<RoomHandle, RepositoryError> {
        if self.ledger.contains(&room.id).await {
            return Err(RepositoryError::RoomEnded(room.id.into_string()));
        }

        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.id) {
            return Err(RepositoryError::RoomAlreadyExists(room.id.into_string()));
        }

        let room_id = room.id.clone();
        let handle = Arc::new(Mutex::new(room));
        rooms.insert(room_id.clone(), handle.clone());
        tracing::debug!("Room '{}' registered ({} active)", room_id, rooms.len());
        Ok(handle)
    }

    async fn find(&self, room_id: &RoomId) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned()
    }

    async fn list(&self) -> Vec<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.values().cloned().collect()
    }

    async fn mark_ended(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        // 記録に失敗しても索引からは必ず外す
        let recorded = self.ledger.record(room_id).await;
        let mut rooms = self.rooms.write().await;
        rooms.remove(room_id);
        tracing::debug!("Room '{}' removed ({} active)", room_id, rooms.len());
        recorded
    }

    async fn is_ended(&self, room_id: &RoomId) -> bool {
        self.ledger.contains(room_id).await
    }

    async fn count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Identity, RoomIdFactory, RoomPolicy, Timestamp},
        infrastructure::repository::InMemoryEndedLedger,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRepository の登録・取得・終了記録
    //
    // 【なぜこのテストが必要か】
    // - 終了済みルーム ID が二度と使われないことを保証する必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. 登録したルームを取得できる
    // 2. 同一 ID の二重登録はエラー
    // 3. 終了したルームは索引から消え、同一 ID で再登録できない
    // ========================================

    fn create_test_repository() -> InMemoryRoomRepository {
        InMemoryRoomRepository::new(Arc::new(InMemoryEndedLedger::new()))
    }

    fn create_room(id: &RoomId) -> Room {
        Room::new(
            id.clone(),
            Identity::new("creator".to_string()).unwrap(),
            Timestamp::new(1_000),
            &RoomPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        // テスト項目: 登録したルームを ID で取得できる
        // given (前提条件):
        let repo = create_test_repository();
        let room_id = RoomIdFactory::generate();

        // when (操作):
        repo.insert(create_room(&room_id)).await.unwrap();

        // then (期待する結果):
        let handle = repo.find(&room_id).await.unwrap();
        assert_eq!(handle.lock().await.id, room_id);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_rejected() {
        // テスト項目: 同じ ID のルームを二重登録するとエラーになる
        // given (前提条件):
        let repo = create_test_repository();
        let room_id = RoomIdFactory::generate();
        repo.insert(create_room(&room_id)).await.unwrap();

        // when (操作):
        let result = repo.insert(create_room(&room_id)).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RepositoryError::RoomAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_ended_room_cannot_be_reused() {
        // テスト項目: 終了したルームは索引から削除され、同じ ID で再登録できない
        // given (前提条件):
        let repo = create_test_repository();
        let room_id = RoomIdFactory::generate();
        repo.insert(create_room(&room_id)).await.unwrap();

        // when (操作):
        repo.mark_ended(&room_id).await.unwrap();

        // then (期待する結果):
        assert!(repo.find(&room_id).await.is_none());
        assert!(repo.is_ended(&room_id).await);
        let result = repo.insert(create_room(&room_id)).await;
        assert!(matches!(result, Err(RepositoryError::RoomEnded(_))));
    }
}
