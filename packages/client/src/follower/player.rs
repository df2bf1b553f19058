//! Local video player abstraction.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::{sync::Mutex, time::Instant};

/// Local player the follower drives.
#[async_trait]
pub trait VideoPlayer: Send + Sync {
    /// Load `video_id`, paused at 0.
    async fn load(&self, video_id: &str);

    async fn seek(&self, seconds: f64);

    async fn play(&self);

    async fn pause(&self);

    /// Current position in seconds.
    async fn position(&self) -> f64;

    async fn video_id(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct SimulatedState {
    video_id: Option<String>,
    /// Position at `anchor`
    base: f64,
    /// Set while playing
    anchor: Option<Instant>,
    /// Landing error of upcoming seeks, consumed front first
    seek_errors: VecDeque<f64>,
    /// Landing error once `seek_errors` runs out
    steady_error: f64,
}

impl SimulatedState {
    fn position(&self) -> f64 {
        match self.anchor {
            Some(anchor) => self.base + anchor.elapsed().as_secs_f64(),
            None => self.base,
        }
    }
}

/// In-process player whose clock is tokio time.
///
/// Seeks can be told to land off target, which is how a buffering player
/// behaves and what the convergence loop corrects.
#[derive(Debug, Default)]
pub struct SimulatedPlayer {
    state: Mutex<SimulatedState>,
}

impl SimulatedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each following seek lands `errors[i]` seconds past its target.
    pub fn with_seek_errors(errors: Vec<f64>) -> Self {
        Self {
            state: Mutex::new(SimulatedState {
                seek_errors: errors.into(),
                ..SimulatedState::default()
            }),
        }
    }

    /// Every seek lands `error` seconds past its target.
    pub fn with_steady_error(error: f64) -> Self {
        Self {
            state: Mutex::new(SimulatedState {
                steady_error: error,
                ..SimulatedState::default()
            }),
        }
    }

    pub async fn is_playing(&self) -> bool {
        self.state.lock().await.anchor.is_some()
    }
}

#[async_trait]
impl VideoPlayer for SimulatedPlayer {
    async fn load(&self, video_id: &str) {
        let mut state = self.state.lock().await;
        state.video_id = Some(video_id.to_string());
        state.base = 0.0;
        state.anchor = None;
    }

    async fn seek(&self, seconds: f64) {
        let mut state = self.state.lock().await;
        let error = state
            .seek_errors
            .pop_front()
            .unwrap_or(state.steady_error);
        state.base = (seconds + error).max(0.0);
        if state.anchor.is_some() {
            state.anchor = Some(Instant::now());
        }
    }

    async fn play(&self) {
        let mut state = self.state.lock().await;
        if state.anchor.is_none() {
            state.anchor = Some(Instant::now());
        }
    }

    async fn pause(&self) {
        let mut state = self.state.lock().await;
        state.base = state.position();
        state.anchor = None;
    }

    async fn position(&self) -> f64 {
        self.state.lock().await.position()
    }

    async fn video_id(&self) -> Option<String> {
        self.state.lock().await.video_id.clone()
    }
}
