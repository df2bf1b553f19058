//! UseCase: ルーム退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - 明示的な退出（即時削除）と切断（猶予期間付きの保留）
//!
//! ### なぜこのテストが必要か
//! - 切断直後に参加者が消えると、リロードのたびにリストがちらつく
//! - 猶予期間が過ぎた後は、確実にリストから削除されて通知される必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：明示的な退出は即座に全員へ通知
//! - 正常系：切断は猶予期間後に通知（ナビゲーション中はより長い猶予）
//! - エッジケース：猶予期間中の再接続で保留が取り消される

use std::{sync::Arc, time::Duration};

use codepair_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, RoomId, RoomPolicy, RoomRepository, Timestamp,
    policy::duration_millis,
};

use super::{
    error::LeaveRoomError,
    notify::{broadcast_participants, remove_participant},
};

/// 退出の理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    /// ユーザー操作による退出：即座に削除
    Intentional,
    /// 通信の切断：猶予期間だけ枠を保留
    Disconnect {
        /// 切断前にアプリ内ナビゲーションが予告されていたか
        navigating: bool,
    },
}

/// 退出処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Removed,
    Held { generation: u64, hold: Duration },
    /// 既に参加者ではない
    NotPresent,
}

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    policy: RoomPolicy,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        policy: RoomPolicy,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            policy,
        }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        reason: LeaveReason,
    ) -> Result<LeaveOutcome, LeaveRoomError> {
        let handle = self
            .repository
            .find(room_id)
            .await
            .ok_or_else(|| LeaveRoomError::RoomNotFound(room_id.as_str().to_string()))?;
        let mut room = handle.lock().await;

        match reason {
            LeaveReason::Intentional => {
                let removed =
                    remove_participant(&mut room, self.message_pusher.as_ref(), connection_id)
                        .await;
                Ok(if removed {
                    LeaveOutcome::Removed
                } else {
                    LeaveOutcome::NotPresent
                })
            }
            LeaveReason::Disconnect { navigating } => {
                let hold = self.policy.departure_hold(navigating);
                let deadline = Timestamp::new(
                    self.clock
                        .now_millis()
                        .saturating_add(duration_millis(hold)),
                );
                let Some(generation) = room.presence.hold(connection_id, deadline) else {
                    return Ok(LeaveOutcome::NotPresent);
                };
                tracing::info!(
                    "'{}' dropped from room '{}', holding its slot for {:?}",
                    connection_id,
                    room.id,
                    hold
                );
                self.schedule_release(room_id.clone(), connection_id.clone(), generation, hold);
                Ok(LeaveOutcome::Held { generation, hold })
            }
        }
    }

    fn schedule_release(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        generation: u64,
        hold: Duration,
    ) {
        let repository = self.repository.clone();
        let message_pusher = self.message_pusher.clone();
        tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            release_held_slot(
                repository.as_ref(),
                message_pusher.as_ref(),
                &room_id,
                &connection_id,
                generation,
            )
            .await;
        });
    }
}

/// Release a held slot if it is still held under `generation`, then broadcast the list.
pub(crate) async fn release_held_slot(
    repository: &dyn RoomRepository,
    pusher: &dyn MessagePusher,
    room_id: &RoomId,
    connection_id: &ConnectionId,
    generation: u64,
) -> bool {
    let Some(handle) = repository.find(room_id).await else {
        return false;
    };
    let mut room = handle.lock().await;

    match room.presence.expire(connection_id, generation) {
        Some(participant) => {
            room.channel.forget(connection_id);
            tracing::info!(
                "Grace window of '{}' ({}) in room '{}' elapsed",
                participant.name,
                connection_id,
                room.id
            );
            broadcast_participants(&room, pusher, None).await;
            true
        }
        None => {
            tracing::debug!(
                "Hold {} of '{}' was superseded, nothing to release",
                generation,
                connection_id
            );
            false
        }
    }
}
