//! Event emission helpers shared by the use cases.
//!
//! All of them are called with the room lock held, so events of one room
//! reach every connection queue in emission order. Push failures only mean
//! the receiving transport is gone and are logged.

use crate::domain::{AccessError, ConnectionId, MessagePusher, Room, RoomEvent};

pub(crate) async fn push_or_warn(
    pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
    event: &RoomEvent,
) {
    if let Err(e) = pusher.push_to(connection_id, event).await {
        tracing::warn!(
            "Failed to push '{}' to '{}': {}",
            event.name(),
            connection_id,
            e
        );
    }
}

pub(crate) async fn broadcast_or_warn(
    pusher: &dyn MessagePusher,
    targets: Vec<ConnectionId>,
    event: &RoomEvent,
) {
    if targets.is_empty() {
        return;
    }
    if let Err(e) = pusher.broadcast(targets, event).await {
        tracing::warn!("Failed to broadcast '{}': {}", event.name(), e);
    }
}

/// Live connections of the room except `exclude`.
pub(crate) fn others(room: &Room, exclude: &ConnectionId) -> Vec<ConnectionId> {
    room.presence
        .live_connections()
        .into_iter()
        .filter(|id| id != exclude)
        .collect()
}

pub(crate) fn participants_event(room: &Room) -> RoomEvent {
    RoomEvent::ParticipantsUpdated {
        room_id: room.id.clone(),
        participants: room.presence.list(),
    }
}

/// Send the current participant list to every live connection except `exclude`.
pub(crate) async fn broadcast_participants(
    room: &Room,
    pusher: &dyn MessagePusher,
    exclude: Option<&ConnectionId>,
) {
    let targets = match exclude {
        Some(exclude) => others(room, exclude),
        None => room.presence.live_connections(),
    };
    broadcast_or_warn(pusher, targets, &participants_event(room)).await;
}

pub(crate) async fn reject_access(
    pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
    room_id: &str,
    reason: &AccessError,
) {
    tracing::info!(
        "Access to room '{}' rejected for '{}': {}",
        room_id,
        connection_id,
        reason
    );
    let event = RoomEvent::AccessRejected {
        room_id: room_id.to_string(),
        reason: reason.clone(),
    };
    push_or_warn(pusher, connection_id, &event).await;
}

/// Remove a participant right away and tell the rest of the room.
///
/// Returns whether the connection was present.
pub(crate) async fn remove_participant(
    room: &mut Room,
    pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
) -> bool {
    let Some(participant) = room.presence.leave_now(connection_id) else {
        return false;
    };
    room.channel.forget(connection_id);
    tracing::info!(
        "'{}' ({}) left room '{}'",
        participant.name,
        connection_id,
        room.id
    );
    broadcast_participants(room, pusher, None).await;
    true
}
