//! The household engine: single owner of all mutable state
//!
//! Every mutation funnels through this type on one logical execution
//! context; there are no concurrent writers. Each mutating method applies
//! the change, re-runs the evaluator (pushing the result to the device
//! restriction collaborator), appends an audit event, and signals the
//! change notifier so the orchestrator can schedule a debounced save.

use chrono::{DateTime, Local, NaiveDate};
use latch_device::DeviceRestriction;
use latch_domain::{
    ChildProfile, Chore, ChoreInstance, EvidenceKind, HouseholdSnapshot, InstanceStatus,
    LearningGoal, ManualOverride, Recurrence, Role, RuleSet, Verdict,
};
use latch_store::{AuditEvent, AuditEventType, Store};
use latch_util::{ChoreId, GoalId, InstanceId, LatchError, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::evaluate::{self, Evaluation};
use crate::{EngineEvent, scheduler, tracker};

/// Verdict shown before the first evaluation runs
const INITIAL_LOCK_REASON: &str = "Complete today's goals";

/// The single owner of household state and the displayed verdict
pub struct HouseholdEngine {
    active_role: Role,
    child_profile: ChildProfile,
    chores: Vec<Chore>,
    chore_instances: Vec<ChoreInstance>,
    learning_goals: Vec<LearningGoal>,
    rule_set: RuleSet,
    parent_override: ManualOverride,
    verdict: Verdict,

    store: Arc<dyn Store>,
    restriction: Arc<dyn DeviceRestriction>,
    notifier: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl HouseholdEngine {
    /// Create an engine seeded from a snapshot, or from built-in defaults
    /// when none is given (cold start).
    pub fn new(
        store: Arc<dyn Store>,
        restriction: Arc<dyn DeviceRestriction>,
        snapshot: Option<HouseholdSnapshot>,
    ) -> Self {
        let seeded = snapshot.is_some();
        let snapshot = snapshot.unwrap_or_else(|| HouseholdSnapshot {
            active_role: Role::Parent,
            child_profile: ChildProfile::new("Child", 0),
            chores: vec![],
            chore_instances: vec![],
            learning_goals: vec![],
            rule_set: RuleSet::default(),
            parent_override: ManualOverride::None,
        });

        info!(
            seeded,
            chore_count = snapshot.chores.len(),
            goal_count = snapshot.learning_goals.len(),
            "Household engine initialized"
        );

        Self {
            active_role: snapshot.active_role,
            child_profile: snapshot.child_profile,
            chores: snapshot.chores,
            chore_instances: snapshot.chore_instances,
            learning_goals: snapshot.learning_goals,
            rule_set: snapshot.rule_set,
            parent_override: snapshot.parent_override,
            verdict: Verdict::locked(INITIAL_LOCK_REASON),
            store,
            restriction,
            notifier: None,
        }
    }

    /// Load the stored snapshot (if any) and build an engine from it.
    pub fn load(store: Arc<dyn Store>, restriction: Arc<dyn DeviceRestriction>) -> Self {
        let snapshot = match store.load_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Snapshot load failed, cold starting");
                None
            }
        };
        Self::new(store, restriction, snapshot)
    }

    /// Register the change notifier the orchestrator listens on.
    pub fn set_change_notifier(&mut self, tx: mpsc::UnboundedSender<EngineEvent>) {
        self.notifier = Some(tx);
    }

    // Accessors

    pub fn active_role(&self) -> Role {
        self.active_role
    }

    pub fn child_profile(&self) -> &ChildProfile {
        &self.child_profile
    }

    pub fn chores(&self) -> &[Chore] {
        &self.chores
    }

    pub fn chore_instances(&self) -> &[ChoreInstance] {
        &self.chore_instances
    }

    pub fn learning_goals(&self) -> &[LearningGoal] {
        &self.learning_goals
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rule_set
    }

    pub fn parent_override(&self) -> ManualOverride {
        self.parent_override
    }

    /// The displayed verdict (the cached result of the last evaluation)
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Serialize the current state for persistence
    pub fn snapshot(&self) -> HouseholdSnapshot {
        HouseholdSnapshot {
            active_role: self.active_role,
            child_profile: self.child_profile.clone(),
            chores: self.chores.clone(),
            chore_instances: self.chore_instances.clone(),
            learning_goals: self.learning_goals.clone(),
            rule_set: self.rule_set.clone(),
            parent_override: self.parent_override,
        }
    }

    // Mutations

    /// Create a chore definition
    pub fn add_chore(
        &mut self,
        title: impl Into<String>,
        details: impl Into<String>,
        points: u32,
        recurrence: Recurrence,
        due_date: Option<NaiveDate>,
        now: DateTime<Local>,
    ) -> ChoreId {
        let chore = scheduler::create_chore(title, details, points, recurrence, due_date);
        let chore_id = chore.id;

        self.audit(AuditEventType::ChoreCreated {
            chore_id,
            title: chore.title.clone(),
        });
        info!(chore_id = %chore_id, points, "Chore created");

        self.chores.push(chore);
        self.notify(EngineEvent::ChoreCreated { chore_id });
        self.refresh(now);
        chore_id
    }

    /// Expand chores into today's obligations, skipping (chore, date)
    /// pairs that already have an instance. Returns how many were added.
    pub fn schedule_today(&mut self, now: DateTime<Local>) -> usize {
        let today = now.date_naive();
        let fresh: Vec<ChoreInstance> = scheduler::schedule_instances(&self.chores, today)
            .into_iter()
            .filter(|candidate| {
                !self.chore_instances.iter().any(|existing| {
                    existing.chore_id == candidate.chore_id
                        && existing.scheduled_date == candidate.scheduled_date
                })
            })
            .collect();

        let count = fresh.len();
        if count > 0 {
            self.audit(AuditEventType::InstancesScheduled {
                day: today.to_string(),
                count,
            });
            info!(day = %today, count, "Instances scheduled");

            self.chore_instances.extend(fresh);
            self.notify(EngineEvent::InstancesScheduled { day: today, count });
            self.refresh(now);
        }
        count
    }

    /// Submit proof for an instance
    pub fn submit_evidence(
        &mut self,
        instance_id: InstanceId,
        kind: EvidenceKind,
        reference: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<()> {
        let index = self.instance_index(instance_id)?;
        self.chore_instances[index] =
            scheduler::submit_evidence(&self.chore_instances[index], kind, reference, now);

        self.audit(AuditEventType::EvidenceSubmitted { instance_id });
        debug!(instance_id = %instance_id, "Evidence submitted");

        self.notify(EngineEvent::InstanceUpdated {
            instance_id,
            status: InstanceStatus::Submitted,
        });
        self.refresh(now);
        Ok(())
    }

    /// Approve an instance (idempotent)
    pub fn approve(&mut self, instance_id: InstanceId, now: DateTime<Local>) -> Result<()> {
        let index = self.instance_index(instance_id)?;
        self.chore_instances[index] = scheduler::approve(&self.chore_instances[index]);

        self.audit(AuditEventType::InstanceApproved { instance_id });
        info!(instance_id = %instance_id, "Instance approved");

        self.notify(EngineEvent::InstanceUpdated {
            instance_id,
            status: InstanceStatus::Approved,
        });
        self.refresh(now);
        Ok(())
    }

    /// Reject an instance
    pub fn reject(&mut self, instance_id: InstanceId, now: DateTime<Local>) -> Result<()> {
        let index = self.instance_index(instance_id)?;
        self.chore_instances[index] = scheduler::reject(&self.chore_instances[index]);

        self.audit(AuditEventType::InstanceRejected { instance_id });
        info!(instance_id = %instance_id, "Instance rejected");

        self.notify(EngineEvent::InstanceUpdated {
            instance_id,
            status: InstanceStatus::Rejected,
        });
        self.refresh(now);
        Ok(())
    }

    /// Create a learning goal (target in minutes)
    pub fn add_goal(
        &mut self,
        title: impl Into<String>,
        target_minutes: u64,
        now: DateTime<Local>,
    ) -> GoalId {
        let goal = tracker::create_goal(title, target_minutes);
        let goal_id = goal.id;

        self.audit(AuditEventType::GoalCreated {
            goal_id,
            title: goal.title.clone(),
        });
        info!(goal_id = %goal_id, target_seconds = goal.target_seconds, "Goal created");

        self.learning_goals.push(goal);
        self.notify(EngineEvent::GoalCreated { goal_id });
        self.refresh(now);
        goal_id
    }

    /// Replace a goal's target (supervisor edit)
    pub fn set_goal_target(
        &mut self,
        goal_id: GoalId,
        target_minutes: u64,
        now: DateTime<Local>,
    ) -> Result<()> {
        let goal = self.goal_mut(goal_id)?;
        goal.target_seconds = target_minutes * 60;

        self.notify(EngineEvent::GoalUpdated { goal_id });
        self.refresh(now);
        Ok(())
    }

    /// Replace a goal's progress outright (manual adjustment)
    pub fn set_goal_progress(
        &mut self,
        goal_id: GoalId,
        progress_seconds: u64,
        now: DateTime<Local>,
    ) -> Result<()> {
        let goal = self.goal_mut(goal_id)?;
        *goal = tracker::set_progress(goal, progress_seconds);

        self.notify(EngineEvent::GoalUpdated { goal_id });
        self.refresh(now);
        Ok(())
    }

    /// Re-allocate today's reported usage total across goals
    pub fn apply_usage_seconds(&mut self, total_seconds: u64, now: DateTime<Local>) {
        self.learning_goals =
            tracker::apply_daily_usage_seconds(&self.learning_goals, total_seconds);

        debug!(total_seconds, "Usage applied to goals");
        self.notify(EngineEvent::UsageApplied {
            total_seconds,
        });
        self.refresh(now);
    }

    /// Replace the active rule set
    pub fn set_rule_set(&mut self, rule_set: RuleSet, now: DateTime<Local>) {
        self.audit(AuditEventType::RuleSetChanged {
            policy: format!("{:?}", rule_set.policy),
        });
        info!(policy = ?rule_set.policy, "Rule set changed");

        self.rule_set = rule_set;
        self.notify(EngineEvent::RuleSetChanged);
        self.refresh(now);
    }

    /// Toggle the manual override
    pub fn set_override(&mut self, state: ManualOverride, now: DateTime<Local>) {
        self.audit(AuditEventType::OverrideChanged {
            state: format!("{:?}", state),
        });
        info!(state = ?state, "Override changed");

        self.parent_override = state;
        self.notify(EngineEvent::OverrideChanged { state });
        self.refresh(now);
    }

    /// Switch the active view between parent and child
    pub fn switch_role(&mut self, role: Role, now: DateTime<Local>) {
        self.active_role = role;
        self.notify(EngineEvent::RoleChanged { role });
        self.refresh(now);
    }

    /// Replace the child profile
    pub fn set_profile(&mut self, profile: ChildProfile, now: DateTime<Local>) {
        self.child_profile = profile;
        self.notify(EngineEvent::ProfileChanged);
        self.refresh(now);
    }

    /// Re-run the evaluator and publish the verdict.
    ///
    /// Safe to call at any time; mutations call it themselves. The device
    /// restriction collaborator is informed on every evaluation regardless
    /// of whether the verdict changed; its failures are logged and
    /// swallowed, never surfaced.
    pub fn refresh(&mut self, now: DateTime<Local>) {
        let Evaluation {
            verdict,
            approved_window_active,
        } = evaluate::evaluate(
            self.parent_override,
            &self.rule_set,
            &self.chore_instances,
            &self.chores,
            &self.learning_goals,
            now,
        );

        if let Some(active) = approved_window_active
            && let Err(e) = self.restriction.set_approved_only_active(active)
        {
            warn!(error = %e, "Failed to apply approved-only window state");
        }

        if let Err(e) = self.restriction.set_restricted(verdict.is_locked()) {
            warn!(error = %e, "Failed to apply restriction state");
        }

        if verdict != self.verdict {
            info!(
                locked = verdict.is_locked(),
                reason = verdict.reason().unwrap_or("-"),
                "Verdict changed"
            );
            self.audit(AuditEventType::VerdictChanged {
                locked: verdict.is_locked(),
                reason: verdict.reason().map(String::from),
            });
            self.notify(EngineEvent::VerdictChanged {
                verdict: verdict.clone(),
            });
        }

        self.verdict = verdict;
    }

    // Internal helpers

    fn instance_index(&self, instance_id: InstanceId) -> Result<usize> {
        self.chore_instances
            .iter()
            .position(|instance| instance.id == instance_id)
            .ok_or(LatchError::InstanceNotFound(instance_id))
    }

    fn goal_mut(&mut self, goal_id: GoalId) -> Result<&mut LearningGoal> {
        self.learning_goals
            .iter_mut()
            .find(|goal| goal.id == goal_id)
            .ok_or(LatchError::GoalNotFound(goal_id))
    }

    fn audit(&self, event: AuditEventType) {
        let _ = self.store.append_audit(AuditEvent::new(event));
    }

    fn notify(&self, event: EngineEvent) {
        if let Some(tx) = &self.notifier {
            let _ = tx.send(event);
        }
    }
}
