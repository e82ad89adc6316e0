//! Host-side implementations of the device collaborator traits
//!
//! The usage counter reads the shared per-day cell in the store: whatever
//! process measures learning-app time (a platform extension, a separate
//! agent) writes seconds there, and the refresh cycle picks them up. The
//! restriction control on this host only logs; real shielding belongs to a
//! platform integration that does not exist here.

use latch_device::{DeviceError, DeviceResult, DeviceRestriction, UsageCounter};
use latch_store::Store;
use std::sync::Arc;
use tracing::info;

/// Usage counter backed by the store's shared per-day cell
pub struct StoreUsageCounter {
    store: Arc<dyn Store>,
}

impl StoreUsageCounter {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

impl UsageCounter for StoreUsageCounter {
    fn usage_seconds_today(&self) -> DeviceResult<u64> {
        let today = latch_util::now().date_naive();
        self.store
            .get_usage_seconds(today)
            .map_err(|e| DeviceError::UsageReadFailed(e.to_string()))
    }
}

/// Restriction control that records the decision in the log only
#[derive(Default)]
pub struct LogOnlyRestriction;

impl DeviceRestriction for LogOnlyRestriction {
    fn set_restricted(&self, restricted: bool) -> DeviceResult<()> {
        info!(restricted, "Device restriction state");
        Ok(())
    }

    fn set_approved_only_active(&self, active: bool) -> DeviceResult<()> {
        info!(active, "Approved-only window state");
        Ok(())
    }
}
