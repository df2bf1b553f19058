//! Tunable room policy.

use std::time::Duration;

/// Timing and capacity knobs applied to every room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPolicy {
    /// How long a dropped connection keeps its slot before the departure is broadcast.
    pub grace_window: Duration,
    /// Hold applied instead of `grace_window` when the connection announced in-app navigation.
    pub navigation_window: Duration,
    /// Age after which a message id no longer counts as a duplicate.
    pub dedup_window: Duration,
    /// Maximum number of message ids remembered per connection.
    pub dedup_capacity: usize,
    /// Number of recent messages replayed to a joining connection.
    pub history_capacity: usize,
    /// Rooms older than this are ended by the reaper.
    pub room_ttl: Duration,
    pub reaper_interval: Duration,
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self {
            grace_window: Duration::from_secs(5),
            navigation_window: Duration::from_secs(15),
            dedup_window: Duration::from_secs(60),
            dedup_capacity: 256,
            history_capacity: 100,
            room_ttl: Duration::from_secs(24 * 60 * 60),
            reaper_interval: Duration::from_secs(60),
        }
    }
}

impl RoomPolicy {
    /// Hold duration for a dropped transport.
    pub fn departure_hold(&self, navigating: bool) -> Duration {
        if navigating {
            self.navigation_window
        } else {
            self.grace_window
        }
    }
}

/// Convert a duration to whole milliseconds, saturating at `i64::MAX`.
pub fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
