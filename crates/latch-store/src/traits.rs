//! Store trait definitions

use chrono::NaiveDate;
use latch_domain::HouseholdSnapshot;

use crate::{AuditEvent, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Household snapshot

    /// Load the last saved snapshot. `Ok(None)` means absent or not
    /// decodable; either way the caller cold-starts from defaults.
    fn load_snapshot(&self) -> StoreResult<Option<HouseholdSnapshot>>;

    /// Save the household snapshot, replacing any previous one
    fn save_snapshot(&self, snapshot: &HouseholdSnapshot) -> StoreResult<()>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Shared usage counter cell

    /// Accumulated learning-app seconds recorded for a day (0 if none)
    fn get_usage_seconds(&self, day: NaiveDate) -> StoreResult<u64>;

    /// Record accumulated learning-app seconds for a day
    fn set_usage_seconds(&self, day: NaiveDate, seconds: u64) -> StoreResult<()>;

    // Health

    /// Check if the store is healthy
    fn is_healthy(&self) -> bool;
}
