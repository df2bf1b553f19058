//! Playback follower: applies server playback states to a local player.
//!
//! For each state it compensates network delay, drives the player, then runs a
//! convergence loop in the background. A newer state replaces (aborts) the
//! pending loop; dropping the follower aborts it too.

pub mod convergence;
pub mod drift;
pub mod guard;
pub mod player;

use std::sync::Arc;

use codepair_server::infrastructure::dto::websocket::{PlaybackStateDto, PlaybackStatusDto};
use codepair_shared::time::Clock;
use tokio::task::JoinHandle;

pub use convergence::{ConvergenceConfig, ConvergenceOutcome, Target, converge};
pub use drift::adjusted_time;
pub use guard::SyncGuard;
pub use player::{SimulatedPlayer, VideoPlayer};

/// What the follower did with a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApplyOutcome {
    /// Applied; the player was sent to `target` seconds.
    Applied { target: f64 },
    /// An authoritative state older than one already applied.
    Stale,
}

pub struct PlaybackFollower {
    player: Arc<dyn VideoPlayer>,
    guard: Arc<SyncGuard>,
    clock: Arc<dyn Clock>,
    config: ConvergenceConfig,
    last_version: Option<u64>,
    pending: Option<JoinHandle<ConvergenceOutcome>>,
}

impl PlaybackFollower {
    pub fn new(
        player: Arc<dyn VideoPlayer>,
        guard: Arc<SyncGuard>,
        clock: Arc<dyn Clock>,
        config: ConvergenceConfig,
    ) -> Self {
        Self {
            player,
            guard,
            clock,
            config,
            last_version: None,
            pending: None,
        }
    }

    /// Apply a received state.
    ///
    /// Authoritative states older than the last applied version are ignored.
    /// Advisory states (relayed commands of non-leaders) are applied without
    /// moving the version watermark.
    pub async fn apply(&mut self, state: &PlaybackStateDto, authoritative: bool) -> ApplyOutcome {
        if authoritative {
            if self.last_version.is_some_and(|last| state.version < last) {
                tracing::debug!(
                    "Ignoring stale playback state v{} (have v{:?})",
                    state.version,
                    self.last_version
                );
                return ApplyOutcome::Stale;
            }
            self.last_version = Some(state.version);
        }

        self.cancel_pending();
        let generation = self.guard.begin();

        if let Some(video_id) = &state.video_id
            && self.player.video_id().await.as_deref() != Some(video_id.as_str())
        {
            self.player.load(video_id).await;
        }

        let target = adjusted_time(state, self.clock.now_millis());
        match state.status {
            PlaybackStatusDto::Playing => {
                self.player.seek(target).await;
                self.player.play().await;
            }
            PlaybackStatusDto::Paused => {
                self.player.pause().await;
                self.player.seek(target).await;
            }
            PlaybackStatusDto::Stopped => {
                self.player.pause().await;
                self.guard.release(generation);
                return ApplyOutcome::Applied { target };
            }
        }

        let player = self.player.clone();
        let guard = self.guard.clone();
        let config = self.config.clone();
        let goal = Target::new(target, state.status == PlaybackStatusDto::Playing);
        self.pending = Some(tokio::spawn(async move {
            let outcome = converge(player.as_ref(), goal, &config).await;
            guard.release(generation);
            outcome
        }));

        ApplyOutcome::Applied { target }
    }

    /// Wait for the pending convergence loop, if any.
    pub async fn settle(&mut self) -> Option<ConvergenceOutcome> {
        let pending = self.pending.take()?;
        pending.await.ok()
    }

    /// Abort the pending convergence loop.
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn last_version(&self) -> Option<u64> {
        self.last_version
    }

    pub fn guard(&self) -> &Arc<SyncGuard> {
        &self.guard
    }
}

impl Drop for PlaybackFollower {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
