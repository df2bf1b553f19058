//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - アクセス検証、ゲストへのトークン発行、参加者リストの通知
//!
//! ### なぜこのテストが必要か
//! - 参加者リストは参加時刻順で、参加のたびに全員へ通知される必要がある
//! - 猶予期間中の再接続では他の参加者に変化を通知しない（ちらつき防止）
//! - 拒否された接続には理由と恒久性が通知される必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成者とゲストの参加
//! - 正常系：猶予期間中のリロード
//! - 異常系：終了済みルーム、別ルームのトークン、空の表示名

use std::sync::Arc;

use codepair_shared::time::Clock;

use crate::domain::{
    AccessError, ConnectionId, DisplayName, GuestIdentityFactory, JoinOutcome, MessagePusher,
    Participant, Role, RoomEvent, RoomId, RoomRepository, SessionToken, SessionValidator,
    Timestamp,
};

use super::{
    error::JoinRoomError,
    notify::{broadcast_participants, participants_event, push_or_warn, reject_access},
    validate_access::ValidateAccessUseCase,
};

/// 参加リクエスト（ワイヤ上の値そのまま）
#[derive(Debug, Clone)]
pub struct JoinRoomInput {
    pub connection_id: ConnectionId,
    pub room_id: String,
    pub token: Option<String>,
    pub name: String,
}

/// 参加結果
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    pub room_id: RoomId,
    /// 接続が以後の保護された操作で提示するセッション
    pub session: SessionToken,
    pub outcome: JoinOutcome,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    sessions: Arc<SessionValidator>,
    clock: Arc<dyn Clock>,
    access: ValidateAccessUseCase,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sessions: Arc<SessionValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            access: ValidateAccessUseCase::new(repository, sessions.clone()),
            message_pusher,
            sessions,
            clock,
        }
    }

    /// 参加を実行
    ///
    /// アクセスが拒否された場合は、接続に `access_rejected` を送った上でエラーを返します。
    ///
    /// 参加した接続には次の順でイベントが送られます:
    /// `session_issued`（トークンなしで参加した場合のみ）, `participants_updated`,
    /// `message_history`（履歴がある場合のみ）, `playback_state_changed`
    pub async fn execute(&self, input: JoinRoomInput) -> Result<JoinedRoom, JoinRoomError> {
        let pusher = self.message_pusher.as_ref();
        let connection_id = input.connection_id;

        let admission = match self
            .access
            .execute(&input.room_id, input.token.as_deref())
            .await
        {
            Ok(admission) => admission,
            Err(reason) => {
                reject_access(pusher, &connection_id, &input.room_id, &reason).await;
                return Err(reason.into());
            }
        };
        let name = DisplayName::new(input.name)?;

        let mut room = admission.handle.lock().await;
        if room.ended {
            let reason = AccessError::RoomEnded;
            reject_access(pusher, &connection_id, &input.room_id, &reason).await;
            return Err(reason.into());
        }

        let (session, newly_issued) = match admission.session {
            Some(session) => (session, false),
            None => {
                let session = self
                    .sessions
                    .issue(
                        admission.room_id.clone(),
                        GuestIdentityFactory::generate(),
                        Role::Guest,
                    )
                    .await?;
                (session, true)
            }
        };

        let now = Timestamp::new(self.clock.now_millis());
        let participant = Participant::new(
            connection_id.clone(),
            session.holder.clone(),
            session.role,
            name,
            now,
        );
        let outcome = room.presence.join(participant)?;
        if let JoinOutcome::Resumed { replaced, .. } = &outcome {
            if *replaced != connection_id {
                room.channel.forget(replaced);
            }
        }

        match &outcome {
            JoinOutcome::Joined => tracing::info!(
                "'{}' joined room '{}' as {}",
                connection_id,
                room.id,
                session.role.as_str()
            ),
            JoinOutcome::Resumed { replaced, .. } => tracing::info!(
                "'{}' resumed the held slot of '{}' in room '{}'",
                connection_id,
                replaced,
                room.id
            ),
        }

        if newly_issued {
            let event = RoomEvent::SessionIssued {
                session: session.clone(),
                connection_id: connection_id.clone(),
            };
            push_or_warn(pusher, &connection_id, &event).await;
        }

        push_or_warn(pusher, &connection_id, &participants_event(&room)).await;

        let history = room.channel.history();
        if !history.is_empty() {
            let event = RoomEvent::MessageHistory {
                room_id: room.id.clone(),
                messages: history,
            };
            push_or_warn(pusher, &connection_id, &event).await;
        }

        let playback = RoomEvent::PlaybackStateChanged {
            room_id: room.id.clone(),
            state: room.playback.clone(),
            authoritative: true,
            issued_by: None,
        };
        push_or_warn(pusher, &connection_id, &playback).await;

        let list_changed = match &outcome {
            JoinOutcome::Joined => true,
            JoinOutcome::Resumed { list_changed, .. } => *list_changed,
        };
        if list_changed {
            broadcast_participants(&room, pusher, Some(&connection_id)).await;
        }

        Ok(JoinedRoom {
            room_id: admission.room_id,
            session,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{PresenceError, ValueObjectError},
        usecase::{
            LeaveReason, LeaveRoomUseCase, SendMessageUseCase,
            test_support::Fixture,
        },
    };

    fn names(event: &serde_json::Value) -> Vec<String> {
        event["participants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect()
    }

    fn input(client: &ConnectionId, room_id: &str, token: Option<&str>, name: &str) -> JoinRoomInput {
        JoinRoomInput {
            connection_id: client.clone(),
            room_id: room_id.to_string(),
            token: token.map(str::to_string),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_creator_and_guest_see_same_list() {
        // テスト項目: 作成者とゲストが参加すると、両者に同じ参加者リストが届く
        // given (前提条件):
        let fixture = Fixture::new();
        let creator_token = fixture.create_room().await;
        let mut creator = fixture.connect().await;
        let mut guest = fixture.connect().await;
        fixture.join(&creator, &creator_token, Some(&creator_token), "Creator").await;
        creator.drain();

        // when (操作):
        fixture.clock.advance(1_000);
        fixture.join(&guest, &creator_token, None, "Guest-42").await;

        // then (期待する結果):
        let creator_events = creator.drain();
        assert_eq!(creator_events.len(), 1);
        assert_eq!(creator_events[0]["type"], "participants_updated");
        assert_eq!(names(&creator_events[0]), vec!["Creator", "Guest-42"]);

        let guest_events = guest.drain();
        let list = guest_events
            .iter()
            .find(|e| e["type"] == "participants_updated")
            .unwrap();
        assert_eq!(names(list), vec!["Creator", "Guest-42"]);
        // チャットメッセージとしての参加通知は送られない
        assert!(guest_events.iter().all(|e| e["type"] != "message_delivered"));
    }

    #[tokio::test]
    async fn test_guest_without_token_receives_session() {
        // テスト項目: トークンなしで参加したゲストに guest トークンが発行され、通知される
        // given (前提条件):
        let fixture = Fixture::new();
        let creator_token = fixture.create_room().await;
        let mut guest = fixture.connect().await;

        // when (操作):
        let session = fixture.join(&guest, &creator_token, None, "Guest-42").await;

        // then (期待する結果):
        assert_eq!(session.role, Role::Guest);
        assert_eq!(
            guest.drain_types(),
            vec!["session_issued", "participants_updated", "playback_state_changed"]
        );
    }

    #[tokio::test]
    async fn test_joiner_receives_recent_history() {
        // テスト項目: 後から参加した接続は直近のチャット履歴を受け取る
        // given (前提条件):
        let fixture = Fixture::new();
        let creator_token = fixture.create_room().await;
        let creator = fixture.connect().await;
        fixture.join(&creator, &creator_token, Some(&creator_token), "Creator").await;
        SendMessageUseCase::new(fixture.repository.clone(), fixture.pusher.clone(), fixture.clock.clone())
            .execute(&creator.id, &creator_token.room_id, "m1".to_string(), "hello".to_string())
            .await
            .unwrap();
        let mut guest = fixture.connect().await;

        // when (操作):
        fixture.join(&guest, &creator_token, None, "Guest-42").await;

        // then (期待する結果):
        let events = guest.drain();
        let history = events.iter().find(|e| e["type"] == "message_history").unwrap();
        assert_eq!(history["messages"][0]["text"], "hello");
        assert_eq!(history["messages"][0]["sender_name"], "Creator");
    }

    #[tokio::test]
    async fn test_reload_within_grace_does_not_flicker() {
        // テスト項目: 猶予期間中に同じ identity で再接続すると、他の参加者には何も通知されない
        // given (前提条件):
        let fixture = Fixture::new();
        let creator_token = fixture.create_room().await;
        let mut creator = fixture.connect().await;
        let guest = fixture.connect().await;
        fixture.join(&creator, &creator_token, Some(&creator_token), "Creator").await;
        let guest_token = fixture.join(&guest, &creator_token, None, "Guest-42").await;
        LeaveRoomUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
            fixture.policy.clone(),
        )
        .execute(&guest.id, &creator_token.room_id, LeaveReason::Disconnect { navigating: false })
        .await
        .unwrap();
        creator.drain();

        // when (操作):
        let mut reloaded = fixture.connect().await;
        let joined = fixture
            .join_usecase()
            .execute(input(
                &reloaded.id,
                creator_token.room_id.as_str(),
                Some(guest_token.token.as_str()),
                "Guest-42",
            ))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(matches!(joined.outcome, JoinOutcome::Resumed { list_changed: false, .. }));
        assert!(creator.drain().is_empty());
        let events = reloaded.drain();
        assert_eq!(names(&events[0]), vec!["Creator", "Guest-42"]);
        let handle = fixture.repository.find(&creator_token.room_id).await.unwrap();
        assert_eq!(handle.lock().await.presence.len(), 2);
    }

    #[tokio::test]
    async fn test_token_for_other_room_is_rejected_permanently() {
        // テスト項目: 別ルームのトークンで参加すると恒久的な拒否が通知され、参加者は増えない
        // given (前提条件):
        let fixture = Fixture::new();
        let room_a = fixture.create_room().await;
        let room_b = fixture.create_room().await;
        let mut client = fixture.connect().await;

        // when (操作):
        let result = fixture
            .join_usecase()
            .execute(input(&client.id, room_b.room_id.as_str(), Some(room_a.token.as_str()), "X"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinRoomError::Access(AccessError::RoomMismatch))));
        let events = client.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "access_rejected");
        assert_eq!(events[0]["reason"], "room_mismatch");
        assert_eq!(events[0]["permanent"], true);
        let handle = fixture.repository.find(&room_b.room_id).await.unwrap();
        assert!(handle.lock().await.presence.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_room_is_not_found() {
        // テスト項目: 存在しないルームへの参加は一時的な拒否（RoomNotFound）になる
        // given (前提条件):
        let fixture = Fixture::new();
        let mut client = fixture.connect().await;

        // when (操作):
        let result = fixture
            .join_usecase()
            .execute(input(&client.id, "missing", None, "X"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinRoomError::Access(AccessError::RoomNotFound))));
        assert_eq!(client.drain()[0]["permanent"], false);
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        // テスト項目: 空の表示名では参加できない
        // given (前提条件):
        let fixture = Fixture::new();
        let creator_token = fixture.create_room().await;
        let client = fixture.connect().await;

        // when (操作):
        let result = fixture
            .join_usecase()
            .execute(input(&client.id, creator_token.room_id.as_str(), None, " "))
            .await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            JoinRoomError::InvalidInput(ValueObjectError::Empty("name"))
        );
    }

    #[tokio::test]
    async fn test_same_connection_cannot_join_twice() {
        // テスト項目: 同じ接続で二重に参加するとエラーになる
        // given (前提条件):
        let fixture = Fixture::new();
        let creator_token = fixture.create_room().await;
        let client = fixture.connect().await;
        fixture.join(&client, &creator_token, Some(&creator_token), "Creator").await;

        // when (操作):
        let result = fixture
            .join_usecase()
            .execute(input(
                &client.id,
                creator_token.room_id.as_str(),
                Some(creator_token.token.as_str()),
                "Creator",
            ))
            .await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            JoinRoomError::Presence(PresenceError::AlreadyJoined(client.id.as_str().to_string()))
        );
    }

    fn leave_usecase(fixture: &Fixture) -> LeaveRoomUseCase {
        LeaveRoomUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
            fixture.policy.clone(),
        )
    }

    #[tokio::test]
    async fn test_repeated_reloads_do_not_accumulate_dedup_windows() {
        // テスト項目: リロードを繰り返しても、引き継がれた古い接続の重複排除ウィンドウは残らない
        // given (前提条件):
        let fixture = Fixture::new();
        let creator_token = fixture.create_room().await;
        let creator = fixture.connect().await;
        fixture.join(&creator, &creator_token, Some(&creator_token), "Creator").await;
        let first = fixture.connect().await;
        let guest_token = fixture.join(&first, &creator_token, None, "Guest-42").await;
        let room_id = creator_token.room_id.clone();
        let send = SendMessageUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.clock.clone(),
        );
        let leave = leave_usecase(&fixture);
        send.execute(&first.id, &room_id, "m0".to_string(), "hi".to_string())
            .await
            .unwrap();
        leave
            .execute(&first.id, &room_id, LeaveReason::Disconnect { navigating: false })
            .await
            .unwrap();

        // when (操作):
        for n in 1..=10 {
            let reloaded = fixture.connect().await;
            fixture.join(&reloaded, &creator_token, Some(&guest_token), "Guest-42").await;
            send.execute(&reloaded.id, &room_id, format!("m{}", n), "hi".to_string())
                .await
                .unwrap();
            leave
                .execute(&reloaded.id, &room_id, LeaveReason::Disconnect { navigating: false })
                .await
                .unwrap();
        }

        // then (期待する結果):
        let handle = fixture.repository.find(&room_id).await.unwrap();
        let room = handle.lock().await;
        assert_eq!(room.presence.len(), 2);
        // 送信したのは保留中のゲスト接続のみ
        assert_eq!(room.channel.tracked_connections(), 1);
    }

    #[tokio::test]
    async fn test_same_connection_rejoins_after_disconnect_leave() {
        // テスト項目: disconnect で離脱した接続が猶予期間中に同じ接続で再参加すると、枠が復帰し他の参加者には通知されない
        // given (前提条件):
        let fixture = Fixture::new();
        let creator_token = fixture.create_room().await;
        let mut creator = fixture.connect().await;
        let mut guest = fixture.connect().await;
        fixture.join(&creator, &creator_token, Some(&creator_token), "Creator").await;
        let guest_token = fixture.join(&guest, &creator_token, None, "Guest-42").await;
        leave_usecase(&fixture)
            .execute(
                &guest.id,
                &creator_token.room_id,
                LeaveReason::Disconnect { navigating: false },
            )
            .await
            .unwrap();
        creator.drain();
        guest.drain();

        // when (操作):
        let joined = fixture
            .join_usecase()
            .execute(input(
                &guest.id,
                creator_token.room_id.as_str(),
                Some(guest_token.token.as_str()),
                "Guest-42",
            ))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            joined.outcome,
            JoinOutcome::Resumed {
                replaced: guest.id.clone(),
                list_changed: false
            }
        );
        assert!(creator.drain().is_empty());
        assert_eq!(guest.drain_types()[0], "participants_updated");
        let handle = fixture.repository.find(&creator_token.room_id).await.unwrap();
        let room = handle.lock().await;
        assert_eq!(room.presence.live_connections().len(), 2);
    }
}
