//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::{PlaybackStateDto, RoleDto};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    /// Opaque identity of the creator, provided by an upstream auth layer.
    pub creator_identity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub token: String,
    /// RFC 3339 (JST)
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub connection_id: String,
    pub name: String,
    pub role: RoleDto,
    /// RFC 3339 (JST)
    pub joined_at: String,
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    /// RFC 3339 (JST)
    pub created_at: String,
    pub participants: Vec<ParticipantDetailDto>,
    pub playback: PlaybackStateDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
