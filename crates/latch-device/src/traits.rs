//! Device collaborator traits

use thiserror::Error;

/// Errors from device collaborator operations
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Usage read failed: {0}")]
    UsageReadFailed(String),

    #[error("Restriction apply failed: {0}")]
    RestrictionFailed(String),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Reports accumulated usage of the learning app set for the current day.
///
/// Day-rollover reset semantics are owned by the counter, not the engine;
/// a decreasing value is anomalous but is applied as reported.
pub trait UsageCounter: Send + Sync {
    fn usage_seconds_today(&self) -> DeviceResult<u64>;
}

/// Applies the lock decision to the device.
///
/// Calls are fire-and-forget from the engine's point of view: errors are
/// logged and swallowed at the boundary, never surfaced to evaluation.
pub trait DeviceRestriction: Send + Sync {
    /// Inform the device of the current verdict: restricted iff locked.
    fn set_restricted(&self, restricted: bool) -> DeviceResult<()>;

    /// Inform the device whether the approved-only window is active, so it
    /// can shield everything outside the approved app set.
    fn set_approved_only_active(&self, active: bool) -> DeviceResult<()>;
}
