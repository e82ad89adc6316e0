//! Learning progress tracking
//!
//! One combined usage counter is "spent" across goals in list order. The
//! counter reports a cumulative total for the day, so each application
//! re-allocates from scratch rather than adding: allocation is a pure
//! function of (goals, total), which keeps repeated applications of the
//! same total idempotent. This models a single shared pool, not per-app
//! attribution.

use latch_domain::LearningGoal;
use latch_util::GoalId;

/// Construct a new goal. Target is given in minutes, stored in seconds.
pub fn create_goal(title: impl Into<String>, target_minutes: u64) -> LearningGoal {
    LearningGoal {
        id: GoalId::new(),
        title: title.into(),
        target_seconds: target_minutes * 60,
        progress_seconds: 0,
    }
}

/// Allocate today's cumulative usage total across goals, greedily in order.
///
/// Each goal receives `min(target, remaining pool)`; the pool shrinks by
/// what was granted. Goals past the point of pool exhaustion read zero.
pub fn apply_daily_usage_seconds(
    goals: &[LearningGoal],
    total_seconds_today: u64,
) -> Vec<LearningGoal> {
    let mut remaining = total_seconds_today;
    goals
        .iter()
        .map(|goal| {
            let applied = goal.target_seconds.min(remaining);
            remaining -= applied;
            LearningGoal {
                progress_seconds: applied,
                ..goal.clone()
            }
        })
        .collect()
}

/// Replace a goal's progress outright (manual adjustment, independent of
/// the usage-counter allocation).
pub fn set_progress(goal: &LearningGoal, new_seconds: u64) -> LearningGoal {
    LearningGoal {
        progress_seconds: new_seconds,
        ..goal.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_allocation_in_list_order() {
        let goals = vec![create_goal("Reading", 20), create_goal("Math practice", 15)];
        // targets: 1200s, 900s

        let updated = apply_daily_usage_seconds(&goals, 1500);
        assert_eq!(updated[0].progress_seconds, 1200);
        assert_eq!(updated[1].progress_seconds, 300);
    }

    #[test]
    fn pool_smaller_than_first_target() {
        let goals = vec![create_goal("Reading", 20), create_goal("Math practice", 15)];

        let updated = apply_daily_usage_seconds(&goals, 400);
        assert_eq!(updated[0].progress_seconds, 400);
        assert_eq!(updated[1].progress_seconds, 0);
    }

    #[test]
    fn pool_exceeding_all_targets_caps_each_goal() {
        let goals = vec![create_goal("Reading", 20), create_goal("Math practice", 15)];

        let updated = apply_daily_usage_seconds(&goals, 10_000);
        assert_eq!(updated[0].progress_seconds, 1200);
        assert_eq!(updated[1].progress_seconds, 900);
    }

    #[test]
    fn reapplying_same_total_is_idempotent() {
        let goals = vec![create_goal("Reading", 20), create_goal("Math practice", 15)];

        let once = apply_daily_usage_seconds(&goals, 1500);
        let twice = apply_daily_usage_seconds(&once, 1500);
        assert_eq!(once, twice);
    }

    #[test]
    fn zero_total_resets_progress() {
        let goals = vec![create_goal("Reading", 20)];
        let progressed = apply_daily_usage_seconds(&goals, 600);
        assert_eq!(progressed[0].progress_seconds, 600);

        // Day rollover: the external counter resets, so the allocation does too.
        let reset = apply_daily_usage_seconds(&progressed, 0);
        assert_eq!(reset[0].progress_seconds, 0);
    }

    #[test]
    fn create_goal_stores_seconds() {
        let goal = create_goal("Reading", 20);
        assert_eq!(goal.target_seconds, 1200);
        assert_eq!(goal.progress_seconds, 0);
    }

    #[test]
    fn set_progress_replaces_outright() {
        let goal = create_goal("Reading", 20);
        let adjusted = set_progress(&goal, 5000);
        assert_eq!(adjusted.progress_seconds, 5000);
        assert_eq!(adjusted.target_seconds, 1200);
    }
}
