//! Message channel state of one room: per-connection dedup windows and a
//! bounded history used to replay recent chat to joining connections.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{
    entity::ChatMessage,
    value_object::{ConnectionId, MessageId, Timestamp},
};

/// Recently seen message ids of one sender connection.
///
/// Bounded both by age (`window_millis`) and by count (`capacity`).
#[derive(Debug)]
pub struct DedupWindow {
    window_millis: i64,
    capacity: usize,
    order: VecDeque<(MessageId, Timestamp)>,
    seen: HashSet<MessageId>,
}

impl DedupWindow {
    pub fn new(window_millis: i64, capacity: usize) -> Self {
        Self {
            window_millis,
            capacity: capacity.max(1),
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Record `id` and report whether it was new.
    pub fn record(&mut self, id: &MessageId, now: Timestamp) -> bool {
        self.prune(now);
        if self.seen.contains(id) {
            return false;
        }

        self.order.push_back((id.clone(), now));
        self.seen.insert(id.clone());
        while self.order.len() > self.capacity {
            if let Some((evicted, _)) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        true
    }

    fn prune(&mut self, now: Timestamp) {
        while let Some((id, seen_at)) = self.order.front() {
            if now.millis_since(*seen_at) <= self.window_millis {
                break;
            }
            self.seen.remove(id);
            self.order.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Outcome of offering a message to the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Accepted(ChatMessage),
    Duplicate,
}

#[derive(Debug)]
pub struct MessageChannel {
    dedup_window_millis: i64,
    dedup_capacity: usize,
    history_capacity: usize,
    dedup: HashMap<ConnectionId, DedupWindow>,
    history: VecDeque<ChatMessage>,
}

impl MessageChannel {
    pub fn new(dedup_window_millis: i64, dedup_capacity: usize, history_capacity: usize) -> Self {
        Self {
            dedup_window_millis,
            dedup_capacity,
            history_capacity,
            dedup: HashMap::new(),
            history: VecDeque::new(),
        }
    }

    /// Accept `message` unless its id was already seen from the same connection.
    pub fn offer(&mut self, message: ChatMessage) -> Delivery {
        let (window_millis, capacity) = (self.dedup_window_millis, self.dedup_capacity);
        let window = self
            .dedup
            .entry(message.from.clone())
            .or_insert_with(|| DedupWindow::new(window_millis, capacity));

        if !window.record(&message.id, message.timestamp) {
            return Delivery::Duplicate;
        }

        if self.history_capacity > 0 {
            self.history.push_back(message.clone());
            while self.history.len() > self.history_capacity {
                self.history.pop_front();
            }
        }
        Delivery::Accepted(message)
    }

    /// Drop the dedup window of a connection that left.
    pub fn forget(&mut self, connection_id: &ConnectionId) {
        self.dedup.remove(connection_id);
    }

    /// Connections that currently have a dedup window.
    pub fn tracked_connections(&self) -> usize {
        self.dedup.len()
    }

    /// Recent messages, oldest first.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.dedup.clear();
        self.history.clear();
    }
}
