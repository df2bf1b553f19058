//! Presence registry: the authoritative set of participants of one room.
//!
//! Participants are keyed by connection, so two tabs of the same identity are
//! two entries. A dropped transport does not remove its entry right away: the
//! slot is put on hold with a [`PendingDeparture`] and is only released when
//! the hold expires. If the same identity joins again while the slot is held,
//! the new connection takes the slot over and the hold is cancelled.

use std::collections::HashMap;

use super::{
    entity::{Participant, PendingDeparture},
    error::PresenceError,
    value_object::{ConnectionId, Timestamp},
};

/// Result of admitting a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// A new slot was added.
    Joined,
    /// The connection took over a slot held for the same identity.
    Resumed {
        replaced: ConnectionId,
        /// Whether the visible entry changed (e.g. a different display name).
        list_changed: bool,
    },
}

#[derive(Debug, Default)]
pub struct Presence {
    participants: HashMap<ConnectionId, Participant>,
    next_generation: u64,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, mut participant: Participant) -> Result<JoinOutcome, PresenceError> {
        let held = match self.participants.get(&participant.connection_id) {
            Some(existing) if existing.is_live() => {
                return Err(PresenceError::AlreadyJoined(
                    participant.connection_id.as_str().to_string(),
                ));
            }
            // The connection left with a held slot and is coming back on the same transport.
            Some(existing) => Some(existing.connection_id.clone()),
            // Oldest held slot of the same identity wins, so reload order is stable.
            None => self
                .participants
                .values()
                .filter(|p| p.identity == participant.identity && !p.is_live())
                .min_by_key(|p| (p.joined_at, p.connection_id.clone()))
                .map(|p| p.connection_id.clone()),
        };

        let outcome = match held.and_then(|id| self.participants.remove(&id)) {
            Some(previous) => {
                // Outstanding release timers carry an older generation.
                self.next_generation += 1;
                participant.joined_at = previous.joined_at;
                JoinOutcome::Resumed {
                    replaced: previous.connection_id,
                    list_changed: previous.identity != participant.identity
                        || previous.name != participant.name
                        || previous.role != participant.role,
                }
            }
            None => JoinOutcome::Joined,
        };

        participant.pending_departure = None;
        self.participants
            .insert(participant.connection_id.clone(), participant);
        Ok(outcome)
    }

    /// Remove a participant immediately.
    pub fn leave_now(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        self.participants.remove(connection_id)
    }

    /// Put a participant's slot on hold until `deadline`.
    ///
    /// Returns the generation to pass to [`Presence::expire`], or `None` if the
    /// connection is not a participant.
    pub fn hold(&mut self, connection_id: &ConnectionId, deadline: Timestamp) -> Option<u64> {
        let participant = self.participants.get_mut(connection_id)?;
        self.next_generation += 1;
        let generation = self.next_generation;
        participant.pending_departure = Some(PendingDeparture {
            deadline,
            generation,
        });
        Some(generation)
    }

    /// Release a held slot if it is still held under `generation`.
    pub fn expire(&mut self, connection_id: &ConnectionId, generation: u64) -> Option<Participant> {
        let still_held = self
            .participants
            .get(connection_id)
            .and_then(|p| p.pending_departure)
            .is_some_and(|pending| pending.generation == generation);

        if still_held {
            self.participants.remove(connection_id)
        } else {
            None
        }
    }

    /// Release every held slot whose deadline has passed.
    pub fn expire_due(&mut self, now: Timestamp) -> Vec<Participant> {
        let due: Vec<ConnectionId> = self
            .participants
            .values()
            .filter(|p| p.pending_departure.is_some_and(|pending| pending.deadline <= now))
            .map(|p| p.connection_id.clone())
            .collect();

        due.iter()
            .filter_map(|id| self.participants.remove(id))
            .collect()
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.participants.get(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.participants.contains_key(connection_id)
    }

    /// Participants sorted by join time, then connection id.
    pub fn list(&self) -> Vec<Participant> {
        let mut participants: Vec<Participant> = self.participants.values().cloned().collect();
        participants.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.connection_id.cmp(&b.connection_id))
        });
        participants
    }

    /// Connections with an attached transport, i.e. broadcast targets.
    pub fn live_connections(&self) -> Vec<ConnectionId> {
        self.list()
            .into_iter()
            .filter(Participant::is_live)
            .map(|p| p.connection_id)
            .collect()
    }

    /// Every connection, including held slots.
    pub fn all_connections(&self) -> Vec<ConnectionId> {
        self.participants.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn clear(&mut self) {
        self.participants.clear();
    }
}
