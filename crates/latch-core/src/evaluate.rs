//! The unlock decision
//!
//! `evaluate` is a pure function of the household data and the clock. No
//! state is stored here; each call recomputes the verdict from scratch (the
//! engine caches the *displayed* verdict, the function itself is stateless).
//! It never fails: missing data defaults toward a lock, never toward a
//! silent unlock.

use chrono::{DateTime, Local};
use latch_domain::{
    Chore, ChoreInstance, InstanceStatus, LearningGoal, LockPolicy, ManualOverride, RuleSet,
    Verdict,
};

/// The evaluator's full output for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,

    /// Present only under `ApprovedOnlyWindow`: whether the window is
    /// currently active. The caller forwards this to the restriction
    /// collaborator; the evaluator itself performs no side effects.
    pub approved_window_active: Option<bool>,
}

impl Evaluation {
    fn plain(verdict: Verdict) -> Self {
        Self {
            verdict,
            approved_window_active: None,
        }
    }
}

/// Sum of points over approved instances whose chore still exists.
///
/// A dangling chore reference contributes nothing: the chore is unknown,
/// so it is worth zero points.
pub fn earned_xp<'a, I>(instances: I, chores: &[Chore]) -> u32
where
    I: IntoIterator<Item = &'a ChoreInstance>,
{
    instances
        .into_iter()
        .filter(|instance| instance.status == InstanceStatus::Approved)
        .filter_map(|instance| chores.iter().find(|chore| chore.id == instance.chore_id))
        .map(|chore| chore.points)
        .sum()
}

/// Decide whether the device should be locked right now.
///
/// "Today" is calendar-day equality with `now` in local time; instances
/// scheduled for other days are ignored. Duplicate instances per
/// (chore, date) are tolerated, the predicates are idempotent over them.
pub fn evaluate(
    parent_override: ManualOverride,
    rules: &RuleSet,
    instances: &[ChoreInstance],
    chores: &[Chore],
    goals: &[LearningGoal],
    now: DateTime<Local>,
) -> Evaluation {
    // A manual override wins outright; policy is not consulted.
    match parent_override {
        ManualOverride::Locked => return Evaluation::plain(Verdict::locked("Parent locked")),
        ManualOverride::Unlocked => return Evaluation::plain(Verdict::Unlocked),
        ManualOverride::None => {}
    }

    let window = rules.unlock_window();

    match rules.policy {
        LockPolicy::Off => Evaluation::plain(Verdict::Unlocked),

        LockPolicy::ScheduleOnly => {
            if window.contains(&now) {
                Evaluation::plain(Verdict::Unlocked)
            } else {
                Evaluation::plain(Verdict::locked(format!(
                    "Locked until {}",
                    window.start_label()
                )))
            }
        }

        LockPolicy::ApprovedOnlyWindow => {
            let within = window.contains(&now);
            let verdict = if within {
                // Inside the window the device runs only the approved set;
                // that still reads as "locked" from the child's side.
                Verdict::locked("Approved apps only")
            } else {
                Verdict::Unlocked
            };
            Evaluation {
                verdict,
                approved_window_active: Some(within),
            }
        }

        LockPolicy::LockUntilGoalsMet => {
            let today = now.date_naive();
            let today_instances: Vec<&ChoreInstance> = instances
                .iter()
                .filter(|instance| instance.scheduled_date == today)
                .collect();

            let all_chores_approved = !today_instances.is_empty()
                && today_instances
                    .iter()
                    .all(|instance| instance.status == InstanceStatus::Approved);
            let all_goals_met = goals.iter().all(LearningGoal::is_met);
            let xp = earned_xp(today_instances.iter().copied(), chores);
            let meets_xp = xp >= rules.required_daily_xp;

            if all_chores_approved && all_goals_met && meets_xp {
                Evaluation::plain(Verdict::Unlocked)
            } else {
                // Fixed priority: only the first unmet condition is shown.
                let reason = if !meets_xp {
                    format!("Earn {} XP today", rules.required_daily_xp)
                } else if !all_chores_approved {
                    "Finish + get chores approved".to_string()
                } else {
                    "Finish learning goals".to_string()
                };
                Evaluation::plain(Verdict::locked(reason))
            }
        }
    }
}
