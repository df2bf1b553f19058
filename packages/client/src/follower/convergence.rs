//! Convergence verification after a remote seek or play.
//!
//! A player does not always land where it was told (buffering, keyframes).
//! After applying a state the follower re-checks the actual position against
//! the target, re-seeks when it is off by more than the tolerance and backs
//! off exponentially between checks. When the attempts run out it keeps the
//! closest position it saw.

use std::time::Duration;

use tokio::time::Instant;

use super::player::VideoPlayer;

/// Convergence tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceConfig {
    /// Accepted distance from the target, in seconds
    pub tolerance: f64,
    pub max_attempts: u32,
    /// Wait before the first check; doubled after every miss
    pub initial_backoff: Duration,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            max_attempts: 4,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

/// Where the player should be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Position at `anchor`, in seconds
    pub position: f64,
    pub playing: bool,
    pub anchor: Instant,
}

impl Target {
    pub fn new(position: f64, playing: bool) -> Self {
        Self {
            position,
            playing,
            anchor: Instant::now(),
        }
    }

    /// Expected position at `now`.
    pub fn at(&self, now: Instant) -> f64 {
        if self.playing {
            self.position + now.saturating_duration_since(self.anchor).as_secs_f64()
        } else {
            self.position
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergenceOutcome {
    Converged {
        attempts: u32,
        /// Distance from the target at the successful check
        error: f64,
    },
    /// Attempts exhausted; the closest observed distance is kept.
    Timeout { attempts: u32, best_error: f64 },
}

/// Check the player against `target` until it is within tolerance.
pub async fn converge(
    player: &dyn VideoPlayer,
    target: Target,
    config: &ConvergenceConfig,
) -> ConvergenceOutcome {
    let mut backoff = config.initial_backoff;
    let mut best_error = f64::INFINITY;

    for attempt in 1..=config.max_attempts {
        tokio::time::sleep(backoff).await;

        let expected = target.at(Instant::now());
        let error = (player.position().await - expected).abs();
        best_error = best_error.min(error);
        if error <= config.tolerance {
            tracing::debug!("Converged on attempt {} (off by {:.3}s)", attempt, error);
            return ConvergenceOutcome::Converged {
                attempts: attempt,
                error,
            };
        }

        tracing::debug!(
            "Attempt {}/{}: off by {:.3}s, seeking to {:.3}s",
            attempt,
            config.max_attempts,
            error,
            expected
        );
        player.seek(expected).await;
        backoff = backoff.saturating_mul(2);
    }

    tracing::warn!(
        "Playback did not converge after {} attempts (best {:.3}s off)",
        config.max_attempts,
        best_error
    );
    ConvergenceOutcome::Timeout {
        attempts: config.max_attempts,
        best_error,
    }
}
