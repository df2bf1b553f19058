//! Participant entity.

use crate::domain::value_object::{ConnectionId, DisplayName, Identity, Role, Timestamp};

/// A departure that has been deferred by the grace window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeparture {
    /// When the slot is released unless the identity comes back.
    pub deadline: Timestamp,
    /// Distinguishes successive holds on the same slot so a stale timer cannot release a newer one.
    pub generation: u64,
}

/// 参加者（1 接続 = 1 参加者）
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub identity: Identity,
    pub role: Role,
    pub name: DisplayName,
    pub joined_at: Timestamp,
    pub pending_departure: Option<PendingDeparture>,
}

impl Participant {
    pub fn new(
        connection_id: ConnectionId,
        identity: Identity,
        role: Role,
        name: DisplayName,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            identity,
            role,
            name,
            joined_at,
            pending_departure: None,
        }
    }

    /// Whether the participant's transport is currently attached.
    pub fn is_live(&self) -> bool {
        self.pending_departure.is_none()
    }
}
