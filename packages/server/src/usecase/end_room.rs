//! UseCase: ルーム終了処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EndRoomUseCase::execute() メソッド
//! - `terminate_room`（期限切れによる終了と共通の後始末）
//!
//! ### なぜこのテストが必要か
//! - 終了したルームには二度と参加できないことを保証する
//! - 終了できるのは有効な creator トークンを持つ接続のみ
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成者による終了、全員への通知と切断
//! - 異常系：ゲストによる終了、期限切れトークンでの終了（暗黙の退出）

use std::sync::Arc;

use codepair_shared::time::Clock;

use crate::domain::{
    AccessError, ConnectionId, MessagePusher, RepositoryError, Role, RoomEvent, RoomHandle,
    RoomId, RoomRepository, SessionValidator, Timestamp,
};

use super::{
    error::EndRoomError,
    notify::{broadcast_or_warn, reject_access, remove_participant},
};

/// `room_ended` の `ended_by_name` に使われる、システムによる終了の名前
pub const SYSTEM_ENDER: &str = "system";

/// 誰がルームを終了したか
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndedBy {
    Connection(ConnectionId),
    System,
}

/// ルーム終了のユースケース
pub struct EndRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sessions: Arc<SessionValidator>,
    clock: Arc<dyn Clock>,
}

impl EndRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sessions: Arc<SessionValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sessions,
            clock,
        }
    }

    /// ルームを終了する
    ///
    /// 拒否された場合は、呼び出し元に `access_rejected` を送った上でエラーを返します。
    /// 期限切れトークンの場合は、呼び出し元をルームから退出させます。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        token: &str,
    ) -> Result<Vec<ConnectionId>, EndRoomError> {
        let pusher = self.message_pusher.as_ref();

        let result = self.authorize(room_id, token).await;
        let handle = match result {
            Ok(handle) => handle,
            Err(reason) => {
                if reason == AccessError::Expired
                    && let Some(handle) = self.repository.find(room_id).await
                {
                    let mut room = handle.lock().await;
                    remove_participant(&mut room, pusher, connection_id).await;
                }
                reject_access(pusher, connection_id, room_id.as_str(), &reason).await;
                return Err(reason.into());
            }
        };

        let members = terminate_room(
            &handle,
            self.repository.as_ref(),
            pusher,
            &self.sessions,
            EndedBy::Connection(connection_id.clone()),
            Timestamp::new(self.clock.now_millis()),
        )
        .await?;
        Ok(members)
    }

    async fn authorize(&self, room_id: &RoomId, token: &str) -> Result<RoomHandle, AccessError> {
        let Some(handle) = self.repository.find(room_id).await else {
            return Err(if self.repository.is_ended(room_id).await {
                AccessError::RoomEnded
            } else {
                AccessError::RoomNotFound
            });
        };

        let session = self.sessions.validate(token, room_id, false).await?;
        if session.role != Role::Creator {
            return Err(AccessError::Rejected(
                "only the room creator can end the room".to_string(),
            ));
        }
        Ok(handle)
    }
}

/// End a room: notify and disconnect every live member, purge the room state,
/// revoke its tokens and record the id as ended.
///
/// Returns the connections that were notified. A room that is already ended
/// is left alone and yields an empty list.
pub(crate) async fn terminate_room(
    handle: &RoomHandle,
    repository: &dyn RoomRepository,
    pusher: &dyn MessagePusher,
    sessions: &SessionValidator,
    ended_by: EndedBy,
    now: Timestamp,
) -> Result<Vec<ConnectionId>, RepositoryError> {
    let mut room = handle.lock().await;
    if room.ended {
        return Ok(Vec::new());
    }

    let ended_by_name = match &ended_by {
        EndedBy::Connection(id) => room
            .presence
            .get(id)
            .map(|p| p.name.as_str().to_string())
            .unwrap_or_else(|| room.creator.as_str().to_string()),
        EndedBy::System => SYSTEM_ENDER.to_string(),
    };

    let members = room.end(now);
    let room_id = room.id.clone();
    let event = RoomEvent::RoomEnded {
        room_id: room_id.clone(),
        ended_by_name: ended_by_name.clone(),
    };
    broadcast_or_warn(pusher, members.clone(), &event).await;
    drop(room);

    // Record the end before closing sockets: the ender's own handler may be
    // cancelled once its connection closes.
    sessions.revoke_room(&room_id).await;
    let recorded = repository.mark_ended(&room_id).await;
    for member in &members {
        pusher.disconnect(member).await;
    }
    recorded?;

    tracing::info!(
        "Room '{}' ended by '{}' ({} member(s) disconnected)",
        room_id,
        ended_by_name,
        members.len()
    );
    Ok(members)
}
