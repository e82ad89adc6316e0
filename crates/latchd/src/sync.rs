//! Cross-device sync stub
//!
//! Network sync between household devices is out of scope; this keeps the
//! state machine other code observes without talking to any backend.

use std::time::Duration;

/// Sync lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
    Failed(String),
}

/// Placeholder sync service
pub struct SyncService {
    state: SyncState,
}

impl SyncService {
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Pretend to sync. TODO: back with a real transport once one is chosen.
    pub async fn sync_now(&mut self) {
        self.state = SyncState::Syncing;
        tokio::time::sleep(Duration::from_millis(450)).await;
        self.state = SyncState::Idle;
    }
}

impl Default for SyncService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sync_returns_to_idle() {
        let mut sync = SyncService::new();
        assert_eq!(sync.state(), &SyncState::Idle);
        sync.sync_now().await;
        assert_eq!(sync.state(), &SyncState::Idle);
    }
}
