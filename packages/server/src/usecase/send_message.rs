//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 重複排除、送信者への ack、送信者以外へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 再送された同じメッセージが二重に表示されてはならない
//! - 送信者自身にはメッセージがエコーされない
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 正常系：同じ message_id の再送は破棄
//! - 異常系：空のメッセージ、参加していない接続からの送信

use std::sync::Arc;

use codepair_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, Delivery, MessageContent, MessageId, MessagePusher, RoomEvent,
    RoomId, RoomRepository, Timestamp,
};

use super::{
    error::SendMessageError,
    notify::{broadcast_or_warn, others, push_or_warn},
};

/// メッセージ送信の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// 受理され、`recipients` 件の接続に配信された
    Delivered { recipients: usize },
    /// 既に受理済みの message_id（何も送らない）
    Duplicate,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `message_id` - 送信者が採番した ID（送信者の接続内で一意）
    /// * `text` - 本文（前後の空白除去後に 1〜2000 文字）
    pub async fn execute(
        &self,
        from: &ConnectionId,
        room_id: &RoomId,
        message_id: String,
        text: String,
    ) -> Result<SendOutcome, SendMessageError> {
        let message_id = MessageId::new(message_id)?;
        let content = MessageContent::new(text)?;

        let handle = self
            .repository
            .find(room_id)
            .await
            .ok_or_else(|| SendMessageError::RoomNotFound(room_id.as_str().to_string()))?;
        let mut room = handle.lock().await;

        let sender_name = room
            .presence
            .get(from)
            .filter(|p| p.is_live())
            .map(|p| p.name.clone())
            .ok_or_else(|| SendMessageError::NotAParticipant(from.as_str().to_string()))?;

        let message = ChatMessage::new(
            message_id.clone(),
            room.id.clone(),
            from.clone(),
            sender_name,
            content,
            Timestamp::new(self.clock.now_millis()),
        );

        let message = match room.channel.offer(message) {
            Delivery::Accepted(message) => message,
            Delivery::Duplicate => {
                tracing::debug!("Dropped duplicate message '{}' from '{}'", message_id, from);
                return Ok(SendOutcome::Duplicate);
            }
        };

        let ack = RoomEvent::MessageAcked {
            room_id: room.id.clone(),
            message_id,
        };
        push_or_warn(self.message_pusher.as_ref(), from, &ack).await;

        let targets = others(&room, from);
        let recipients = targets.len();
        broadcast_or_warn(
            self.message_pusher.as_ref(),
            targets,
            &RoomEvent::MessageDelivered { message },
        )
        .await;

        Ok(SendOutcome::Delivered { recipients })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            Identity, MockMessagePusher, Participant, Role, Room, RoomPolicy, DisplayName,
            ValueObjectError,
        },
        infrastructure::repository::{InMemoryEndedLedger, InMemoryRoomRepository},
        usecase::test_support::Fixture,
    };
    use codepair_shared::time::FixedClock;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    /// 作成者とゲストが参加済みのルームを直接組み立てる
    async fn seeded_repository() -> (Arc<InMemoryRoomRepository>, RoomId) {
        let repository = Arc::new(InMemoryRoomRepository::new(Arc::new(
            InMemoryEndedLedger::new(),
        )));
        let room_id = RoomId::new("room-b".to_string()).unwrap();
        let mut room = Room::new(
            room_id.clone(),
            Identity::new("creator".to_string()).unwrap(),
            Timestamp::new(0),
            &RoomPolicy::default(),
        );
        for (id, identity, role, name) in [
            ("c-creator", "creator", Role::Creator, "Creator"),
            ("c-guest", "guest", Role::Guest, "Guest-42"),
        ] {
            room.presence
                .join(Participant::new(
                    conn(id),
                    Identity::new(identity.to_string()).unwrap(),
                    role,
                    DisplayName::new(name.to_string()).unwrap(),
                    Timestamp::new(0),
                ))
                .unwrap();
        }
        repository.insert(room).await.unwrap();
        (repository, room_id)
    }

    #[tokio::test]
    async fn test_duplicate_message_is_delivered_once() {
        // テスト項目: 同じ message_id を二度送っても、配信と ack は一度だけ
        // given (前提条件):
        let (repository, room_id) = seeded_repository().await;
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(|to, event| {
                to.as_str() == "c-guest" && matches!(event, RoomEvent::MessageAcked { .. })
            })
            .times(1)
            .returning(|_, _| Ok(()));
        pusher
            .expect_broadcast()
            .withf(|targets, event| {
                targets == &vec![ConnectionId::new("c-creator".to_string()).unwrap()]
                    && matches!(event, RoomEvent::MessageDelivered { message } if message.content.as_str() == "hi")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase =
            SendMessageUseCase::new(repository, Arc::new(pusher), Arc::new(FixedClock::new(1_000)));

        // when (操作):
        let first = usecase
            .execute(&conn("c-guest"), &room_id, "m1".to_string(), "hi".to_string())
            .await
            .unwrap();
        let second = usecase
            .execute(&conn("c-guest"), &room_id, "m1".to_string(), "hi".to_string())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(first, SendOutcome::Delivered { recipients: 1 });
        assert_eq!(second, SendOutcome::Duplicate);
    }

    #[tokio::test]
    async fn test_message_is_not_echoed_to_sender() {
        // テスト項目: 送信者には ack のみが届き、メッセージ本体はエコーされない
        // given (前提条件):
        let fixture = Fixture::new();
        let room = fixture.create_room().await;
        let mut creator = fixture.connect().await;
        let mut guest = fixture.connect().await;
        fixture.join(&creator, &room, Some(&room), "Creator").await;
        fixture.join(&guest, &room, None, "Guest-42").await;
        creator.drain();
        guest.drain();
        let usecase = SendMessageUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        );

        // when (操作):
        usecase
            .execute(&guest.id, &room.room_id, "m1".to_string(), "hi".to_string())
            .await
            .unwrap();

        // then (期待する結果):
        let guest_events = guest.drain();
        assert_eq!(guest_events.len(), 1);
        assert_eq!(guest_events[0]["type"], "message_acked");
        assert_eq!(guest_events[0]["message_id"], "m1");

        let creator_events = creator.drain();
        assert_eq!(creator_events.len(), 1);
        assert_eq!(creator_events[0]["type"], "message_delivered");
        assert_eq!(creator_events[0]["message"]["text"], "hi");
        assert_eq!(creator_events[0]["message"]["sender_name"], "Guest-42");
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        // テスト項目: 空白のみのメッセージは拒否される
        // given (前提条件):
        let (repository, room_id) = seeded_repository().await;
        let usecase = SendMessageUseCase::new(
            repository,
            Arc::new(MockMessagePusher::new()),
            Arc::new(FixedClock::new(1_000)),
        );

        // when (操作):
        let result = usecase
            .execute(&conn("c-guest"), &room_id, "m1".to_string(), "   ".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::Rejected(ValueObjectError::Empty("text"))));
    }

    #[tokio::test]
    async fn test_too_long_message_is_rejected() {
        // テスト項目: 2000 文字を超えるメッセージは拒否される
        // given (前提条件):
        let (repository, room_id) = seeded_repository().await;
        let usecase = SendMessageUseCase::new(
            repository,
            Arc::new(MockMessagePusher::new()),
            Arc::new(FixedClock::new(1_000)),
        );

        // when (操作):
        let result = usecase
            .execute(&conn("c-guest"), &room_id, "m1".to_string(), "x".repeat(2001))
            .await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(SendMessageError::Rejected(ValueObjectError::TooLong { .. }))
        ));
    }

    #[tokio::test]
    async fn test_non_participant_cannot_send() {
        // テスト項目: 参加していない接続からのメッセージは拒否される
        // given (前提条件):
        let (repository, room_id) = seeded_repository().await;
        let usecase = SendMessageUseCase::new(
            repository,
            Arc::new(MockMessagePusher::new()),
            Arc::new(FixedClock::new(1_000)),
        );

        // when (操作):
        let result = usecase
            .execute(&conn("stranger"), &room_id, "m1".to_string(), "hi".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::NotAParticipant("stranger".to_string()))
        );
    }
}
