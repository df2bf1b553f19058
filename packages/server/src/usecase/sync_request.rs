//! UseCase: 再生状態の同期リクエスト
//!
//! 要求した接続にのみ、正式な再生状態を送ります。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PlaybackState, RoomEvent, RoomId, RoomRepository};

use super::{error::SyncRequestError, notify::push_or_warn};

pub struct SyncRequestUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl SyncRequestUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    pub async fn execute(
        &self,
        requester: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<PlaybackState, SyncRequestError> {
        let handle = self
            .repository
            .find(room_id)
            .await
            .ok_or_else(|| SyncRequestError::RoomNotFound(room_id.as_str().to_string()))?;
        let room = handle.lock().await;

        if !room.presence.contains(requester) {
            return Err(SyncRequestError::NotAParticipant(
                requester.as_str().to_string(),
            ));
        }

        let state = room.playback.clone();
        let event = RoomEvent::PlaybackStateChanged {
            room_id: room.id.clone(),
            state: state.clone(),
            authoritative: true,
            issued_by: None,
        };
        push_or_warn(self.message_pusher.as_ref(), requester, &event).await;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::PlaybackAction,
        usecase::{PlaybackCommandUseCase, test_support::Fixture},
    };

    #[tokio::test]
    async fn test_sync_returns_authoritative_state_to_requester_only() {
        // テスト項目: 同期リクエストには、参考コマンドではなく正式な状態が要求者にだけ返る
        // given (前提条件):
        let fixture = Fixture::new();
        let room = fixture.create_room().await;
        let mut creator = fixture.connect().await;
        let mut guest = fixture.connect().await;
        fixture.join(&creator, &room, Some(&room), "Creator").await;
        fixture.join(&guest, &room, None, "Guest-42").await;
        let playback = PlaybackCommandUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        );
        playback
            .execute(&creator.id, &room.room_id, PlaybackAction::Play, 42.0, Some("vid".to_string()))
            .await
            .unwrap();
        playback
            .execute(&guest.id, &room.room_id, PlaybackAction::Seek, 99.0, None)
            .await
            .unwrap();
        creator.drain();
        guest.drain();

        // when (操作):
        let state = SyncRequestUseCase::new(fixture.repository.clone(), fixture.pusher.clone())
            .execute(&guest.id, &room.room_id)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(state.time, 42.0);
        let events = guest.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["state"]["time"], 42.0);
        assert_eq!(events[0]["authoritative"], true);
        assert!(creator.drain().is_empty());
    }

    #[tokio::test]
    async fn test_sync_requires_membership() {
        // テスト項目: 参加していない接続からの同期リクエストは拒否される
        // given (前提条件):
        let fixture = Fixture::new();
        let room = fixture.create_room().await;
        let stranger = fixture.connect().await;

        // when (操作):
        let result = SyncRequestUseCase::new(fixture.repository.clone(), fixture.pusher.clone())
            .execute(&stranger.id, &room.room_id)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SyncRequestError::NotAParticipant(_))));
    }
}
