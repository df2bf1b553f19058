//! Network delay compensation.

use codepair_server::infrastructure::dto::websocket::{PlaybackStateDto, PlaybackStatusDto};
use codepair_shared::time::millis_to_secs;

/// Position a follower should seek to for `state`, received at `local_now_millis`.
///
/// A playing video has moved on by the time the state arrives, so the delay
/// since `server_timestamp` is added. A negative delay (clock skew) counts as
/// zero. Paused and stopped states apply the position as-is.
pub fn adjusted_time(state: &PlaybackStateDto, local_now_millis: i64) -> f64 {
    match state.status {
        PlaybackStatusDto::Playing => {
            let delay = local_now_millis.saturating_sub(state.server_timestamp).max(0);
            state.time + millis_to_secs(delay)
        }
        PlaybackStatusDto::Paused | PlaybackStatusDto::Stopped => state.time,
    }
}
