//! UseCase: ルーム作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 作成直後のルームが空で、作成者に creator トークンが発行されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム作成とトークン発行
//! - 異常系：空の identity

use std::sync::Arc;

use codepair_shared::time::Clock;

use crate::domain::{
    Identity, Role, Room, RoomIdFactory, RoomPolicy, RoomRepository, SessionToken,
    SessionValidator, Timestamp,
};

use super::error::CreateRoomError;

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    sessions: Arc<SessionValidator>,
    clock: Arc<dyn Clock>,
    policy: RoomPolicy,
}

impl CreateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        sessions: Arc<SessionValidator>,
        clock: Arc<dyn Clock>,
        policy: RoomPolicy,
    ) -> Self {
        Self {
            repository,
            sessions,
            clock,
            policy,
        }
    }

    /// ルームを作成し、作成者の creator トークンを返す
    pub async fn execute(&self, creator_identity: String) -> Result<SessionToken, CreateRoomError> {
        let creator = Identity::new(creator_identity)?;
        let now = Timestamp::new(self.clock.now_millis());

        let room = Room::new(RoomIdFactory::generate(), creator.clone(), now, &self.policy);
        let room_id = room.id.clone();
        self.repository.insert(room).await?;

        let token = self.sessions.issue(room_id, creator, Role::Creator).await?;
        tracing::info!("Room '{}' created by '{}'", token.room_id, token.holder);
        Ok(token)
    }
}
