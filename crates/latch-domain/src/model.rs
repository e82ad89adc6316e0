//! Household value records: profile, chores, instances, learning goals

use chrono::{DateTime, Local, NaiveDate};
use latch_util::{ChildId, ChoreId, GoalId, InstanceId};
use serde::{Deserialize, Serialize};

use crate::snapshot::lenient;

/// The supervised child this household is configured for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub id: ChildId,
    pub display_name: String,
    #[serde(default, deserialize_with = "lenient::u8_or_zero")]
    pub age: u8,
}

impl ChildProfile {
    pub fn new(display_name: impl Into<String>, age: u8) -> Self {
        Self {
            id: ChildId::new(),
            display_name: display_name.into(),
            age,
        }
    }
}

/// How often a chore recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Daily,
    Weekdays,
    Weekends,
    OneOff,
}

/// A chore definition created by the supervisor
///
/// `due_date` is only meaningful when `recurrence` is `OneOff`; downstream
/// logic ignores it otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chore {
    pub id: ChoreId,
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub details: String,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub points: u32,
    pub recurrence: Recurrence,
    #[serde(default, deserialize_with = "lenient::date_or_none")]
    pub due_date: Option<NaiveDate>,
}

/// Approval lifecycle of a single day's obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Todo,
    Submitted,
    Approved,
    Rejected,
}

/// Kind of media attached as chore proof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Photo,
    Video,
}

/// Opaque proof attachment: capture and upload live outside the engine,
/// which only ever sees the reference string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub kind: EvidenceKind,
    pub reference: String,
}

/// A single day's obligation derived from a chore definition
///
/// Holds a non-owning reference to its chore: a dangling `chore_id` is
/// tolerated everywhere and treated as an unknown chore worth zero points.
/// `scheduled_date` is immutable once created; only status, submission
/// timestamp, and evidence mutate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreInstance {
    pub id: InstanceId,
    pub chore_id: ChoreId,
    pub scheduled_date: NaiveDate,
    pub status: InstanceStatus,
    #[serde(default, deserialize_with = "lenient::datetime_or_none")]
    pub submitted_at: Option<DateTime<Local>>,
    #[serde(default, deserialize_with = "lenient::evidence_or_none")]
    pub evidence: Option<Evidence>,
}

/// A supervisor-set learning goal with externally-fed progress
///
/// Stored progress is not bounded above by the target; the excess is only
/// clamped when computing the displayed ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningGoal {
    pub id: GoalId,
    pub title: String,
    pub target_seconds: u64,
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub progress_seconds: u64,
}

impl LearningGoal {
    /// Progress toward the target as a ratio clamped to [0, 1].
    /// A zero target reads as no progress.
    pub fn progress_ratio(&self) -> f64 {
        if self.target_seconds == 0 {
            return 0.0;
        }
        (self.progress_seconds as f64 / self.target_seconds as f64).min(1.0)
    }

    pub fn is_met(&self) -> bool {
        self.progress_seconds >= self.target_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_ratio_clamps_to_one() {
        let goal = LearningGoal {
            id: GoalId::new(),
            title: "Reading".into(),
            target_seconds: 600,
            progress_seconds: 900,
        };
        assert_eq!(goal.progress_ratio(), 1.0);
        assert!(goal.is_met());
    }

    #[test]
    fn progress_ratio_zero_target() {
        let goal = LearningGoal {
            id: GoalId::new(),
            title: "Empty".into(),
            target_seconds: 0,
            progress_seconds: 120,
        };
        assert_eq!(goal.progress_ratio(), 0.0);
    }

    #[test]
    fn progress_ratio_partial() {
        let goal = LearningGoal {
            id: GoalId::new(),
            title: "Math".into(),
            target_seconds: 1200,
            progress_seconds: 300,
        };
        assert_eq!(goal.progress_ratio(), 0.25);
        assert!(!goal.is_met());
    }
}
