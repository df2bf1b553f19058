//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{AccessError, PlaybackError, PresenceError, RepositoryError, ValueObjectError};

/// ルーム作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("invalid creator identity: {0}")]
    InvalidIdentity(#[from] ValueObjectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// ルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("access rejected: {0}")]
    Access(#[from] AccessError),

    #[error("invalid join request: {0}")]
    InvalidInput(#[from] ValueObjectError),

    #[error(transparent)]
    Presence(#[from] PresenceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// ルーム退出のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaveRoomError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("connection '{0}' is not a participant of the room")]
    NotAParticipant(String),

    #[error("message rejected: {0}")]
    Rejected(#[from] ValueObjectError),
}

/// 再生コマンドのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackCommandError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("connection '{0}' is not a participant of the room")]
    NotAParticipant(String),

    #[error("invalid playback command: {0}")]
    InvalidInput(#[from] ValueObjectError),

    #[error("playback command rejected: {0}")]
    Playback(#[from] PlaybackError),
}

/// 再生状態同期リクエストのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncRequestError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("connection '{0}' is not a participant of the room")]
    NotAParticipant(String),
}

/// ルーム終了のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndRoomError {
    #[error("access rejected: {0}")]
    Access(#[from] AccessError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomError {
    #[error("room not found")]
    NotFound,

    #[error("room has ended")]
    Ended,
}
