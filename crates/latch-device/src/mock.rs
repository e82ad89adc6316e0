//! Mock device collaborators for testing

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::{DeviceError, DeviceResult, DeviceRestriction, UsageCounter};

/// Mock usage counter with a settable value
#[derive(Default)]
pub struct MockUsageCounter {
    seconds: AtomicU64,

    /// Configure reads to fail
    pub fail_read: Arc<Mutex<bool>>,
}

impl MockUsageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_seconds(&self, seconds: u64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }
}

impl UsageCounter for MockUsageCounter {
    fn usage_seconds_today(&self) -> DeviceResult<u64> {
        if *self.fail_read.lock().unwrap() {
            return Err(DeviceError::UsageReadFailed("Mock read failure".into()));
        }
        Ok(self.seconds.load(Ordering::SeqCst))
    }
}

/// Mock restriction control that records every call
#[derive(Default)]
pub struct MockRestriction {
    restricted: Mutex<Option<bool>>,
    approved_only: Mutex<Option<bool>>,
    restricted_calls: AtomicU64,

    /// Configure applies to fail
    pub fail_apply: Arc<Mutex<bool>>,
}

impl MockRestriction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last restricted state applied, if any
    pub fn restricted(&self) -> Option<bool> {
        *self.restricted.lock().unwrap()
    }

    /// Last approved-only-window state applied, if any
    pub fn approved_only_active(&self) -> Option<bool> {
        *self.approved_only.lock().unwrap()
    }

    /// Number of set_restricted calls observed
    pub fn restricted_call_count(&self) -> u64 {
        self.restricted_calls.load(Ordering::SeqCst)
    }
}

impl DeviceRestriction for MockRestriction {
    fn set_restricted(&self, restricted: bool) -> DeviceResult<()> {
        self.restricted_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_apply.lock().unwrap() {
            return Err(DeviceError::RestrictionFailed("Mock apply failure".into()));
        }
        *self.restricted.lock().unwrap() = Some(restricted);
        Ok(())
    }

    fn set_approved_only_active(&self, active: bool) -> DeviceResult<()> {
        if *self.fail_apply.lock().unwrap() {
            return Err(DeviceError::RestrictionFailed("Mock apply failure".into()));
        }
        *self.approved_only.lock().unwrap() = Some(active);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_counter_reports_set_value() {
        let counter = MockUsageCounter::new();
        assert_eq!(counter.usage_seconds_today().unwrap(), 0);
        counter.set_seconds(1500);
        assert_eq!(counter.usage_seconds_today().unwrap(), 1500);
    }

    #[test]
    fn mock_counter_read_failure() {
        let counter = MockUsageCounter::new();
        *counter.fail_read.lock().unwrap() = true;
        assert!(counter.usage_seconds_today().is_err());
    }

    #[test]
    fn mock_restriction_records_calls() {
        let restriction = MockRestriction::new();
        assert_eq!(restriction.restricted(), None);

        restriction.set_restricted(true).unwrap();
        restriction.set_approved_only_active(false).unwrap();

        assert_eq!(restriction.restricted(), Some(true));
        assert_eq!(restriction.approved_only_active(), Some(false));
        assert_eq!(restriction.restricted_call_count(), 1);
    }
}
