//! Chat message entity.

use crate::domain::value_object::{
    ConnectionId, DisplayName, MessageContent, MessageId, RoomId, Timestamp,
};

/// 受理済みのチャットメッセージ（不変）
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub from: ConnectionId,
    pub sender_name: DisplayName,
    pub content: MessageContent,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(
        id: MessageId,
        room_id: RoomId,
        from: ConnectionId,
        sender_name: DisplayName,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            from,
            sender_name,
            content,
            timestamp,
        }
    }
}
