//! Audit event types

use chrono::{DateTime, Local};
use latch_util::{ChoreId, GoalId, InstanceId};
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Service started
    ServiceStarted,

    /// Service stopped
    ServiceStopped,

    /// Chore created by the supervisor
    ChoreCreated { chore_id: ChoreId, title: String },

    /// Instances scheduled for a day
    InstancesScheduled { day: String, count: usize },

    /// Proof submitted for an instance
    EvidenceSubmitted { instance_id: InstanceId },

    /// Instance approved
    InstanceApproved { instance_id: InstanceId },

    /// Instance rejected
    InstanceRejected { instance_id: InstanceId },

    /// Learning goal created
    GoalCreated { goal_id: GoalId, title: String },

    /// Rule set replaced
    RuleSetChanged { policy: String },

    /// Manual override toggled
    OverrideChanged { state: String },

    /// Verdict flipped between locked and unlocked
    VerdictChanged {
        locked: bool,
        reason: Option<String>,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID (assigned by the store)
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0,
            timestamp: latch_util::now(),
            event,
        }
    }
}
