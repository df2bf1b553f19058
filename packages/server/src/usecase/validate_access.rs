//! UseCase: ルームへのアクセス検証
//!
//! 判定順序: 終了済み -> 存在しない -> (トークンがあれば) 不一致 / 期限切れ / 不明

use std::sync::Arc;

use crate::domain::{
    AccessError, RoomHandle, RoomId, RoomRepository, SessionToken, SessionValidator,
};

/// 検証を通過したアクセス
pub struct Admission {
    pub room_id: RoomId,
    pub handle: RoomHandle,
    /// 提示されたトークンの検証結果（トークンなしの場合は None）
    pub session: Option<SessionToken>,
}

pub struct ValidateAccessUseCase {
    repository: Arc<dyn RoomRepository>,
    sessions: Arc<SessionValidator>,
}

impl ValidateAccessUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, sessions: Arc<SessionValidator>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    pub async fn execute(
        &self,
        room_id: &str,
        token: Option<&str>,
    ) -> Result<Admission, AccessError> {
        let room_id = RoomId::new(room_id.to_string()).map_err(|_| AccessError::RoomNotFound)?;

        if self.repository.is_ended(&room_id).await {
            return Err(AccessError::RoomEnded);
        }
        let handle = self
            .repository
            .find(&room_id)
            .await
            .ok_or(AccessError::RoomNotFound)?;

        let session = match token {
            Some(token) => Some(self.sessions.validate(token, &room_id, false).await?),
            None => None,
        };

        Ok(Admission {
            room_id,
            handle,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Role, SESSION_TTL_MILLIS},
        usecase::{EndRoomUseCase, test_support::Fixture},
    };

    fn usecase(fixture: &Fixture) -> ValidateAccessUseCase {
        ValidateAccessUseCase::new(fixture.repository.clone(), fixture.sessions.clone())
    }

    #[tokio::test]
    async fn test_admits_valid_creator_token() {
        // テスト項目: 有効な creator トークンで creator として受け入れられる
        // given (前提条件):
        let fixture = Fixture::new();
        let creator = fixture.create_room().await;

        // when (操作):
        let admission = usecase(&fixture)
            .execute(creator.room_id.as_str(), Some(creator.token.as_str()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(admission.room_id, creator.room_id);
        assert_eq!(admission.session.unwrap().role, Role::Creator);
    }

    #[tokio::test]
    async fn test_unknown_room_is_not_found() {
        // テスト項目: 存在しないルームは RoomNotFound になる
        // given (前提条件):
        let fixture = Fixture::new();

        // when (操作):
        let result = usecase(&fixture).execute("no-such-room", None).await;

        // then (期待する結果):
        assert!(matches!(result, Err(AccessError::RoomNotFound)));
    }

    #[tokio::test]
    async fn test_token_for_other_room_is_mismatch() {
        // テスト項目: 別のルームのトークンは RoomMismatch になる
        // given (前提条件):
        let fixture = Fixture::new();
        let room_a = fixture.create_room().await;
        let room_b = fixture.create_room().await;

        // when (操作):
        let result = usecase(&fixture)
            .execute(room_b.room_id.as_str(), Some(room_a.token.as_str()))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(AccessError::RoomMismatch)));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        // テスト項目: 24 時間を超えたトークンは Expired になる
        // given (前提条件):
        let fixture = Fixture::new();
        let creator = fixture.create_room().await;
        fixture.clock.advance(SESSION_TTL_MILLIS + 1_000);

        // when (操作):
        let result = usecase(&fixture)
            .execute(creator.room_id.as_str(), Some(creator.token.as_str()))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(AccessError::Expired)));
    }

    #[tokio::test]
    async fn test_ended_room_is_permanently_rejected() {
        // テスト項目: 終了したルームはトークンの有無に関わらず RoomEnded になる
        // given (前提条件):
        let fixture = Fixture::new();
        let creator = fixture.create_room().await;
        let client = fixture.connect().await;
        fixture.join(&client, &creator, Some(&creator), "Creator").await;
        EndRoomUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.sessions.clone(),
            fixture.clock.clone(),
        )
        .execute(&client.id, &creator.room_id, creator.token.as_str())
        .await
        .unwrap();

        // when (操作):
        let with_token = usecase(&fixture)
            .execute(creator.room_id.as_str(), Some(creator.token.as_str()))
            .await;
        let without_token = usecase(&fixture).execute(creator.room_id.as_str(), None).await;

        // then (期待する結果):
        assert!(matches!(with_token, Err(AccessError::RoomEnded)));
        assert!(matches!(without_token, Err(AccessError::RoomEnded)));
        assert!(AccessError::RoomEnded.is_permanent());
    }
}
