//! Shared playback state and its state machine.
//!
//! ```text
//! Stopped --play--> Playing --pause--> Paused --play--> Playing ...
//!                    |  ^                |  ^
//!                    +--+ seek           +--+ seek
//! ```
//!
//! `Seek` never changes the play/pause flag. `Play` with a different video
//! id loads that video. Every accepted command yields a new state with a
//! non-decreasing server timestamp and a bumped version, so updates are
//! totally ordered.

use codepair_shared::time::millis_to_secs;

use crate::domain::{
    error::PlaybackError,
    value_object::{Identity, Timestamp, VideoId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "stopped",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    Play,
    Pause,
    Seek,
}

impl PlaybackAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackAction::Play => "play",
            PlaybackAction::Pause => "pause",
            PlaybackAction::Seek => "seek",
        }
    }
}

/// A playback command as issued by a participant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackCommand {
    pub action: PlaybackAction,
    /// Position in seconds the issuer wants to be at.
    pub time: f64,
    pub video_id: Option<VideoId>,
}

impl PlaybackCommand {
    pub fn new(action: PlaybackAction, time: f64, video_id: Option<VideoId>) -> Self {
        Self {
            action,
            time,
            video_id,
        }
    }
}

/// ルームに 1 つだけ存在する再生状態
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub video_id: Option<VideoId>,
    /// Position in seconds at `updated_at`.
    pub time: f64,
    pub status: PlaybackStatus,
    /// Authoritative server timestamp of the last update.
    pub updated_at: Timestamp,
    /// Identity whose commands are authoritative (the room creator).
    pub leader: Identity,
    pub version: u64,
}

impl PlaybackState {
    pub fn new(leader: Identity, now: Timestamp) -> Self {
        Self {
            video_id: None,
            time: 0.0,
            status: PlaybackStatus::Stopped,
            updated_at: now,
            leader,
            version: 0,
        }
    }

    pub fn is_leader(&self, identity: &Identity) -> bool {
        &self.leader == identity
    }

    /// Compute the state that results from applying `command` at `now`.
    ///
    /// `self` is left untouched so advisory commands can be evaluated
    /// without becoming ground truth.
    pub fn apply(&self, command: &PlaybackCommand, now: Timestamp) -> Result<Self, PlaybackError> {
        if !command.time.is_finite() || command.time < 0.0 {
            return Err(PlaybackError::InvalidTime);
        }

        let video_id = match command.action {
            PlaybackAction::Play => command
                .video_id
                .clone()
                .or_else(|| self.video_id.clone())
                .ok_or(PlaybackError::MissingVideo)?,
            PlaybackAction::Pause | PlaybackAction::Seek => {
                if self.status == PlaybackStatus::Stopped {
                    return Err(PlaybackError::InvalidTransition {
                        status: self.status.as_str(),
                        action: command.action.as_str(),
                    });
                }
                let current = self.video_id.clone().ok_or(PlaybackError::MissingVideo)?;
                if let Some(requested) = &command.video_id
                    && requested != &current
                {
                    return Err(PlaybackError::VideoMismatch {
                        current: current.into_string(),
                        requested: requested.as_str().to_string(),
                    });
                }
                current
            }
        };

        let status = match command.action {
            PlaybackAction::Play => PlaybackStatus::Playing,
            PlaybackAction::Pause => PlaybackStatus::Paused,
            PlaybackAction::Seek => self.status,
        };

        Ok(Self {
            video_id: Some(video_id),
            time: command.time,
            status,
            updated_at: now.max(self.updated_at),
            leader: self.leader.clone(),
            version: self.version + 1,
        })
    }

    /// Position in seconds at `now`, advancing the clock while playing.
    pub fn position_at(&self, now: Timestamp) -> f64 {
        match self.status {
            PlaybackStatus::Playing => {
                let elapsed = now.millis_since(self.updated_at).max(0);
                self.time + millis_to_secs(elapsed)
            }
            PlaybackStatus::Stopped | PlaybackStatus::Paused => self.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader() -> Identity {
        Identity::new("creator-identity".to_string()).unwrap()
    }

    fn video(id: &str) -> Option<VideoId> {
        Some(VideoId::new(id.to_string()).unwrap())
    }

    fn playing_state() -> PlaybackState {
        PlaybackState::new(leader(), Timestamp::new(1_000))
            .apply(
                &PlaybackCommand::new(PlaybackAction::Play, 10.0, video("two-sum")),
                Timestamp::new(2_000),
            )
            .unwrap()
    }

    #[test]
    fn test_play_from_stopped() {
        // テスト項目: Stopped から Play すると Playing になり、動画が読み込まれる
        // given (前提条件):
        let state = PlaybackState::new(leader(), Timestamp::new(1_000));

        // when (操作):
        let next = state
            .apply(
                &PlaybackCommand::new(PlaybackAction::Play, 120.0, video("two-sum")),
                Timestamp::new(2_000),
            )
            .unwrap();

        // then (期待する結果):
        assert_eq!(next.status, PlaybackStatus::Playing);
        assert_eq!(next.video_id, video("two-sum"));
        assert_eq!(next.time, 120.0);
        assert_eq!(next.updated_at, Timestamp::new(2_000));
        assert_eq!(next.version, 1);
        // 元の状態は変更されない
        assert_eq!(state.status, PlaybackStatus::Stopped);
    }

    #[test]
    fn test_play_from_stopped_without_video_is_rejected() {
        // テスト項目: 動画未指定で Stopped から Play するとエラーになる
        // given (前提条件):
        let state = PlaybackState::new(leader(), Timestamp::new(1_000));

        // when (操作):
        let result = state.apply(
            &PlaybackCommand::new(PlaybackAction::Play, 0.0, None),
            Timestamp::new(2_000),
        );

        // then (期待する結果):
        assert_eq!(result, Err(PlaybackError::MissingVideo));
    }

    #[test]
    fn test_pause_and_seek_from_stopped_are_invalid() {
        // テスト項目: Stopped からの Pause / Seek は不正な遷移として拒否される
        // given (前提条件):
        let state = PlaybackState::new(leader(), Timestamp::new(1_000));

        for action in [PlaybackAction::Pause, PlaybackAction::Seek] {
            // when (操作):
            let result = state.apply(
                &PlaybackCommand::new(action, 5.0, video("two-sum")),
                Timestamp::new(2_000),
            );

            // then (期待する結果):
            assert!(matches!(
                result,
                Err(PlaybackError::InvalidTransition { status: "stopped", .. })
            ));
        }
    }

    #[test]
    fn test_seek_keeps_play_pause_flag() {
        // テスト項目: Seek は再生/一時停止フラグを変更しない
        // given (前提条件):
        let playing = playing_state();
        let paused = playing
            .apply(
                &PlaybackCommand::new(PlaybackAction::Pause, 12.0, None),
                Timestamp::new(3_000),
            )
            .unwrap();

        // when (操作):
        let seek_cmd = PlaybackCommand::new(PlaybackAction::Seek, 60.0, None);
        let seek_while_playing = playing.apply(&seek_cmd, Timestamp::new(4_000)).unwrap();
        let seek_while_paused = paused.apply(&seek_cmd, Timestamp::new(4_000)).unwrap();

        // then (期待する結果):
        assert_eq!(seek_while_playing.status, PlaybackStatus::Playing);
        assert_eq!(seek_while_paused.status, PlaybackStatus::Paused);
        assert_eq!(seek_while_paused.time, 60.0);
    }

    #[test]
    fn test_play_pause_play_cycle() {
        // テスト項目: Playing -> Paused -> Playing の遷移ができ、バージョンが単調増加する
        // given (前提条件):
        let playing = playing_state();

        // when (操作):
        let paused = playing
            .apply(
                &PlaybackCommand::new(PlaybackAction::Pause, 15.0, None),
                Timestamp::new(3_000),
            )
            .unwrap();
        let resumed = paused
            .apply(
                &PlaybackCommand::new(PlaybackAction::Play, 15.0, None),
                Timestamp::new(4_000),
            )
            .unwrap();

        // then (期待する結果):
        assert_eq!(paused.status, PlaybackStatus::Paused);
        assert_eq!(resumed.status, PlaybackStatus::Playing);
        assert_eq!(resumed.video_id, video("two-sum"));
        assert!(playing.version < paused.version && paused.version < resumed.version);
    }

    #[test]
    fn test_play_with_new_video_switches_video() {
        // テスト項目: 別の動画 ID で Play すると動画が切り替わる
        // given (前提条件):
        let playing = playing_state();

        // when (操作):
        let next = playing
            .apply(
                &PlaybackCommand::new(PlaybackAction::Play, 0.0, video("lru-cache")),
                Timestamp::new(3_000),
            )
            .unwrap();

        // then (期待する結果):
        assert_eq!(next.video_id, video("lru-cache"));
        assert_eq!(next.time, 0.0);
    }

    #[test]
    fn test_seek_with_other_video_is_rejected() {
        // テスト項目: 読み込み中と異なる動画 ID への Seek は拒否される
        // given (前提条件):
        let playing = playing_state();

        // when (操作):
        let result = playing.apply(
            &PlaybackCommand::new(PlaybackAction::Seek, 30.0, video("lru-cache")),
            Timestamp::new(3_000),
        );

        // then (期待する結果):
        assert!(matches!(result, Err(PlaybackError::VideoMismatch { .. })));
    }

    #[test]
    fn test_invalid_time_is_rejected() {
        // テスト項目: 負の値や NaN の再生位置は拒否される
        // given (前提条件):
        let playing = playing_state();

        for time in [-1.0, f64::NAN, f64::INFINITY] {
            // when (操作):
            let result = playing.apply(
                &PlaybackCommand::new(PlaybackAction::Seek, time, None),
                Timestamp::new(3_000),
            );

            // then (期待する結果):
            assert_eq!(result, Err(PlaybackError::InvalidTime));
        }
    }

    #[test]
    fn test_server_timestamp_never_goes_backwards() {
        // テスト項目: 時計が巻き戻ってもサーバータイムスタンプは減少しない
        // given (前提条件):
        let playing = playing_state(); // updated_at = 2000

        // when (操作):
        let next = playing
            .apply(
                &PlaybackCommand::new(PlaybackAction::Pause, 10.0, None),
                Timestamp::new(1_500),
            )
            .unwrap();

        // then (期待する結果):
        assert_eq!(next.updated_at, Timestamp::new(2_000));
    }

    #[test]
    fn test_position_advances_only_while_playing() {
        // テスト項目: 再生中のみ経過時間に応じて位置が進む
        // given (前提条件):
        let playing = playing_state(); // time = 10.0 at 2000ms
        let paused = playing
            .apply(
                &PlaybackCommand::new(PlaybackAction::Pause, 10.0, None),
                Timestamp::new(2_000),
            )
            .unwrap();

        // when (操作):
        let playing_pos = playing.position_at(Timestamp::new(4_500));
        let paused_pos = paused.position_at(Timestamp::new(4_500));

        // then (期待する結果):
        assert!((playing_pos - 12.5).abs() < 1e-9);
        assert_eq!(paused_pos, 10.0);
    }
}
