//! Room aggregate: owns presence, message channel and playback state of one room.

use crate::domain::{
    message_channel::MessageChannel,
    policy::{RoomPolicy, duration_millis},
    presence::Presence,
    value_object::{ConnectionId, Identity, RoomId, Timestamp},
};

use super::{Participant, PlaybackState};

/// Read-only copy of a room, taken under its lock.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub created_at: Timestamp,
    pub participants: Vec<Participant>,
    pub playback: PlaybackState,
}

#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub creator: Identity,
    pub created_at: Timestamp,
    pub ended: bool,
    pub presence: Presence,
    pub channel: MessageChannel,
    pub playback: PlaybackState,
}

impl Room {
    /// Create a room with empty presence, channel and a stopped playback led by the creator.
    pub fn new(id: RoomId, creator: Identity, created_at: Timestamp, policy: &RoomPolicy) -> Self {
        Self {
            id,
            playback: PlaybackState::new(creator.clone(), created_at),
            creator,
            created_at,
            ended: false,
            presence: Presence::new(),
            channel: MessageChannel::new(
                duration_millis(policy.dedup_window),
                policy.dedup_capacity,
                policy.history_capacity,
            ),
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            participants: self.presence.list(),
            playback: self.playback.clone(),
        }
    }

    pub fn is_expired(&self, now: Timestamp, ttl_millis: i64) -> bool {
        now.millis_since(self.created_at) > ttl_millis
    }

    /// Mark the room ended and purge its volatile state.
    ///
    /// Returns the live connections that must be notified and disconnected.
    pub fn end(&mut self, now: Timestamp) -> Vec<ConnectionId> {
        let members = self.presence.live_connections();
        self.ended = true;
        self.presence.clear();
        self.channel.clear();
        self.playback = PlaybackState::new(self.creator.clone(), now);
        members
    }
}
