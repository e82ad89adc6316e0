//! Events emitted by the household engine
//!
//! Every state mutation emits an event on the engine's change notifier.
//! The orchestrator treats any mutation event as a reason to (re)start the
//! persistence debounce; `VerdictChanged` is informational only, since the
//! verdict itself is never persisted.

use chrono::NaiveDate;
use latch_domain::{InstanceStatus, ManualOverride, Role, Verdict};
use latch_util::{ChoreId, GoalId, InstanceId};

/// Events emitted by the household engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A chore definition was created
    ChoreCreated { chore_id: ChoreId },

    /// Fresh instances were scheduled for a day
    InstancesScheduled { day: NaiveDate, count: usize },

    /// An instance moved through its lifecycle
    InstanceUpdated {
        instance_id: InstanceId,
        status: InstanceStatus,
    },

    /// A learning goal was created
    GoalCreated { goal_id: GoalId },

    /// A learning goal's target or progress was edited
    GoalUpdated { goal_id: GoalId },

    /// Reported usage was re-allocated across goals
    UsageApplied { total_seconds: u64 },

    /// The rule set was replaced
    RuleSetChanged,

    /// The manual override was toggled
    OverrideChanged { state: ManualOverride },

    /// The active role switched between parent and child
    RoleChanged { role: Role },

    /// The child profile was edited
    ProfileChanged,

    /// The displayed verdict flipped
    VerdictChanged { verdict: Verdict },
}

impl EngineEvent {
    /// Whether this event reflects a persisted-state mutation (and should
    /// therefore schedule a snapshot write).
    pub fn mutates_state(&self) -> bool {
        !matches!(self, EngineEvent::VerdictChanged { .. })
    }
}
