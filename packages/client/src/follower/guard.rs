//! Reentrancy guard between applied remote states and local playback events.

use std::sync::atomic::{AtomicU64, Ordering};

/// Suppresses local playback events while a remote state is being applied.
///
/// Each apply takes a new generation. Only the holder of the current
/// generation can release the guard, so a finished loop of a replaced state
/// does not unlock the one that replaced it.
#[derive(Debug, Default)]
pub struct SyncGuard {
    /// Generation currently applying, 0 when idle
    active: AtomicU64,
    next: AtomicU64,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start applying a remote state and return its generation.
    pub fn begin(&self) -> u64 {
        let generation = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.store(generation, Ordering::SeqCst);
        generation
    }

    /// Release the guard if `generation` still holds it.
    pub fn release(&self, generation: u64) -> bool {
        self.active
            .compare_exchange(generation, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_applying(&self) -> bool {
        self.active.load(Ordering::SeqCst) != 0
    }

    /// Whether a local playback event may be sent as a command.
    pub fn allows_local_events(&self) -> bool {
        !self.is_applying()
    }
}
