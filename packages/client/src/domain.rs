//! Domain logic for client-side operations.
//!
//! Pure functions, kept free of I/O so they are easy to test.

use std::time::Duration;

use crate::error::ClientError;

/// Check if the client should exit immediately based on the error type.
///
/// Permanent rejections (ended room, token of another room) and room ends
/// stop the client; anything else may be retried.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    error.is_permanent()
        || matches!(
            error,
            // An unknown room or token will not become valid by retrying.
            ClientError::AccessRejected { .. } | ClientError::HttpError(_)
        )
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}

/// Wait before reconnect attempt `attempt` (1-indexed).
///
/// The first attempt is immediate so a dropped transport can resume its held
/// slot inside the server's grace window. Later attempts back off by doubling
/// `base`, up to `max`.
pub fn reconnect_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt <= 1 {
        return Duration::ZERO;
    }
    let factor = 1u32.checked_shl(attempt - 2).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(max)
}
