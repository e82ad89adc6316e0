//! Rule set, manual override, and the unlock verdict

use latch_util::DailyWindow;
use serde::{Deserialize, Serialize};

use crate::snapshot::lenient;

/// Default unlock window: 6:00pm - 8:00pm.
pub const DEFAULT_WINDOW_START_MINUTES: u32 = 18 * 60;
pub const DEFAULT_WINDOW_END_MINUTES: u32 = 20 * 60;

/// Which lock policy is in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPolicy {
    /// Never lock
    Off,
    /// Unlock only inside the daily window
    ScheduleOnly,
    /// Restrict to the approved app set while inside the daily window
    ApprovedOnlyWindow,
    /// Lock until chores are approved, goals met, and the XP bar cleared
    LockUntilGoalsMet,
}

/// The active policy for the household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub policy: LockPolicy,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub required_daily_xp: u32,
    #[serde(
        default = "default_window_start",
        deserialize_with = "lenient::window_start"
    )]
    pub unlock_window_start_minutes: u32,
    #[serde(
        default = "default_window_end",
        deserialize_with = "lenient::window_end"
    )]
    pub unlock_window_end_minutes: u32,
}

fn default_window_start() -> u32 {
    DEFAULT_WINDOW_START_MINUTES
}

fn default_window_end() -> u32 {
    DEFAULT_WINDOW_END_MINUTES
}

impl RuleSet {
    /// The daily window with bounds normalized into [0, 1439].
    pub fn unlock_window(&self) -> DailyWindow {
        DailyWindow::new(
            self.unlock_window_start_minutes,
            self.unlock_window_end_minutes,
        )
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            policy: LockPolicy::LockUntilGoalsMet,
            required_daily_xp: 50,
            unlock_window_start_minutes: DEFAULT_WINDOW_START_MINUTES,
            unlock_window_end_minutes: DEFAULT_WINDOW_END_MINUTES,
        }
    }
}

/// A parent-set lock/unlock that bypasses policy evaluation entirely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualOverride {
    #[default]
    None,
    Locked,
    Unlocked,
}

/// Which view of the shared household state is active on this device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Parent,
    Child,
}

/// The evaluator's output: locked with a human-readable reason, or unlocked.
/// Never persisted; recomputed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Locked { reason: String },
    Unlocked,
}

impl Verdict {
    pub fn locked(reason: impl Into<String>) -> Self {
        Self::Locked {
            reason: reason.into(),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Verdict::Locked { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Locked { reason } => Some(reason),
            Verdict::Unlocked => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_set_window() {
        let rules = RuleSet::default();
        let window = rules.unlock_window();
        assert_eq!(window.start_minutes(), 1080);
        assert_eq!(window.end_minutes(), 1200);
        assert_eq!(rules.required_daily_xp, 50);
        assert_eq!(rules.policy, LockPolicy::LockUntilGoalsMet);
    }

    #[test]
    fn out_of_range_window_bounds_normalize() {
        let rules = RuleSet {
            policy: LockPolicy::ScheduleOnly,
            required_daily_xp: 0,
            unlock_window_start_minutes: 9000,
            unlock_window_end_minutes: 1500,
        };
        let window = rules.unlock_window();
        assert_eq!(window.start_minutes(), 1439);
        assert_eq!(window.end_minutes(), 1439);
    }

    #[test]
    fn verdict_accessors() {
        let locked = Verdict::locked("Parent locked");
        assert!(locked.is_locked());
        assert_eq!(locked.reason(), Some("Parent locked"));
        assert!(!Verdict::Unlocked.is_locked());
        assert_eq!(Verdict::Unlocked.reason(), None);
    }
}
