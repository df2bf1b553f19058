//! UseCase: 再生コマンド処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PlaybackCommandUseCase::execute() メソッド
//! - リーダーのコマンドは正式な状態として保存・配信される
//! - リーダー以外のコマンドは参考情報として配信され、保存されない
//!
//! ### なぜこのテストが必要か
//! - 同期の基準はリーダーの最新コマンドであり、参考コマンドで上書きされてはならない
//! - サーバータイムスタンプは単調非減少で、version は更新ごとに増える必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：リーダーの Play / Seek
//! - 正常系：ゲストの参考コマンド
//! - 異常系：停止中の Pause（不正な遷移）

use std::sync::Arc;

use codepair_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, PlaybackAction, PlaybackCommand, PlaybackState, RoomEvent,
    RoomId, RoomRepository, Timestamp, VideoId,
};

use super::{
    error::PlaybackCommandError,
    notify::{broadcast_or_warn, others},
};

/// 処理されたコマンド
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackOutcome {
    /// 配信された状態
    pub state: PlaybackState,
    /// リーダーのコマンドで、正式な状態として保存されたか
    pub authoritative: bool,
}

/// 再生コマンドのユースケース
pub struct PlaybackCommandUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl PlaybackCommandUseCase {
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

    pub async fn execute(
        &self,
        from: &ConnectionId,
        room_id: &RoomId,
        action: PlaybackAction,
        time: f64,
        video_id: Option<String>,
    ) -> Result<PlaybackOutcome, PlaybackCommandError> {
        let video_id = video_id.map(VideoId::new).transpose()?;
        let command = PlaybackCommand::new(action, time, video_id);

        let handle = self
            .repository
            .find(room_id)
            .await
            .ok_or_else(|| PlaybackCommandError::RoomNotFound(room_id.as_str().to_string()))?;
        let mut room = handle.lock().await;

        let issuer = room
            .presence
            .get(from)
            .filter(|p| p.is_live())
            .map(|p| p.identity.clone())
            .ok_or_else(|| PlaybackCommandError::NotAParticipant(from.as_str().to_string()))?;

        let now = Timestamp::new(self.clock.now_millis());
        let mut state = room.playback.apply(&command, now)?;
        let authoritative = room.playback.is_leader(&issuer);

        if authoritative {
            room.playback = state.clone();
            tracing::info!(
                "Room '{}' playback: {} at {:.3}s (v{})",
                room.id,
                state.status.as_str(),
                state.time,
                state.version
            );
        } else {
            // 参考コマンドは version を進めない
            state.version = room.playback.version;
            tracing::debug!(
                "Advisory {} at {:.3}s from '{}' in room '{}'",
                action.as_str(),
                time,
                from,
                room.id
            );
        }

        let event = RoomEvent::PlaybackStateChanged {
            room_id: room.id.clone(),
            state: state.clone(),
            authoritative,
            issued_by: Some(from.clone()),
        };
        broadcast_or_warn(self.message_pusher.as_ref(), others(&room, from), &event).await;

        Ok(PlaybackOutcome {
            state,
            authoritative,
        })
    }
}
