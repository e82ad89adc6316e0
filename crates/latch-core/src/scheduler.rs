//! Chore scheduling and the instance approval lifecycle
//!
//! Pure functions throughout: callers own the collections and decide what
//! to keep. `schedule_instances` is re-callable for any date; callers are
//! responsible for not duplicating instances already scheduled for a day
//! (evaluation tolerates duplicates but nothing deduplicates them).

use chrono::{Datelike, DateTime, Local, NaiveDate, Weekday};
use latch_domain::{Chore, ChoreInstance, Evidence, EvidenceKind, InstanceStatus, Recurrence};
use latch_util::ChoreId;

/// Evidence reference used when the caller supplies none
const PLACEHOLDER_REFERENCE: &str = "placeholder://upload";

/// Construct a new chore with a fresh identity.
///
/// `due_date` is only meaningful for `OneOff` recurrence; downstream logic
/// ignores it otherwise.
pub fn create_chore(
    title: impl Into<String>,
    details: impl Into<String>,
    points: u32,
    recurrence: Recurrence,
    due_date: Option<NaiveDate>,
) -> Chore {
    Chore {
        id: ChoreId::new(),
        title: title.into(),
        details: details.into(),
        points,
        recurrence,
        due_date,
    }
}

/// Expand chore definitions into fresh `Todo` obligations for a date.
///
/// Includes exactly one instance per chore whose recurrence matches the
/// date; chores that don't match contribute nothing.
pub fn schedule_instances(chores: &[Chore], for_date: NaiveDate) -> Vec<ChoreInstance> {
    chores
        .iter()
        .filter(|chore| applies_on(chore.recurrence, chore.due_date, for_date))
        .map(|chore| ChoreInstance {
            id: latch_util::InstanceId::new(),
            chore_id: chore.id,
            scheduled_date: for_date,
            status: InstanceStatus::Todo,
            submitted_at: None,
            evidence: None,
        })
        .collect()
}

fn applies_on(recurrence: Recurrence, due_date: Option<NaiveDate>, date: NaiveDate) -> bool {
    match recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekdays => !is_weekend(date),
        Recurrence::Weekends => is_weekend(date),
        Recurrence::OneOff => due_date == Some(date),
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Submit proof for an instance, moving it to `Submitted`.
///
/// Works from any status: a rejected instance may be resubmitted, and
/// resubmitting an approved instance re-stamps it silently (whether a UI
/// offers that path is its own choice, not enforced here).
pub fn submit_evidence(
    instance: &ChoreInstance,
    kind: EvidenceKind,
    reference: Option<&str>,
    now: DateTime<Local>,
) -> ChoreInstance {
    let mut updated = instance.clone();
    updated.status = InstanceStatus::Submitted;
    updated.submitted_at = Some(now);
    updated.evidence = Some(Evidence {
        kind,
        reference: reference.unwrap_or(PLACEHOLDER_REFERENCE).to_string(),
    });
    updated
}

/// Approve an instance. Idempotent: approving twice is the same approval.
pub fn approve(instance: &ChoreInstance) -> ChoreInstance {
    let mut updated = instance.clone();
    updated.status = InstanceStatus::Approved;
    updated
}

/// Reject an instance. The child may resubmit via `submit_evidence`.
pub fn reject(instance: &ChoreInstance) -> ChoreInstance {
    let mut updated = instance.clone();
    updated.status = InstanceStatus::Rejected;
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 2026-03-10 is a Tuesday, 2026-03-14 a Saturday.
    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn weekend_chore_skips_weekdays() {
        let chore = create_chore("Clean room", "Floor + desk", 30, Recurrence::Weekends, None);

        assert!(schedule_instances(&[chore.clone()], tuesday()).is_empty());

        let scheduled = schedule_instances(&[chore.clone()], saturday());
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].chore_id, chore.id);
        assert_eq!(scheduled[0].scheduled_date, saturday());
        assert_eq!(scheduled[0].status, InstanceStatus::Todo);
    }

    #[test]
    fn weekday_chore_skips_weekends() {
        let chore = create_chore("Homework", "", 25, Recurrence::Weekdays, None);

        assert_eq!(schedule_instances(&[chore.clone()], tuesday()).len(), 1);
        assert!(schedule_instances(&[chore], saturday()).is_empty());
    }

    #[test]
    fn daily_chore_always_matches() {
        let chore = create_chore("Make bed", "", 10, Recurrence::Daily, None);

        assert_eq!(schedule_instances(&[chore.clone()], tuesday()).len(), 1);
        assert_eq!(schedule_instances(&[chore], saturday()).len(), 1);
    }

    #[test]
    fn one_off_matches_only_its_due_date() {
        let due = create_chore("Recital prep", "", 40, Recurrence::OneOff, Some(tuesday()));
        let undated = create_chore("Someday", "", 5, Recurrence::OneOff, None);

        assert_eq!(schedule_instances(&[due.clone()], tuesday()).len(), 1);
        assert!(schedule_instances(&[due], saturday()).is_empty());
        assert!(schedule_instances(&[undated.clone()], tuesday()).is_empty());
        assert!(schedule_instances(&[undated], saturday()).is_empty());
    }

    #[test]
    fn due_date_ignored_for_recurring_chores() {
        // A stray due date on a daily chore changes nothing.
        let chore = create_chore("Make bed", "", 10, Recurrence::Daily, Some(tuesday()));
        assert_eq!(schedule_instances(&[chore], saturday()).len(), 1);
    }

    #[test]
    fn submit_evidence_stamps_and_attaches() {
        let chore = create_chore("Make bed", "", 10, Recurrence::Daily, None);
        let instance = schedule_instances(&[chore], tuesday()).remove(0);
        let now = Local.with_ymd_and_hms(2026, 3, 10, 16, 0, 0).unwrap();

        let submitted = submit_evidence(&instance, EvidenceKind::Photo, None, now);
        assert_eq!(submitted.status, InstanceStatus::Submitted);
        assert_eq!(submitted.submitted_at, Some(now));
        let evidence = submitted.evidence.unwrap();
        assert_eq!(evidence.kind, EvidenceKind::Photo);
        assert_eq!(evidence.reference, PLACEHOLDER_REFERENCE);

        // Scheduled date never moves.
        assert_eq!(submitted.scheduled_date, instance.scheduled_date);
    }

    #[test]
    fn rejected_instance_can_be_resubmitted() {
        let chore = create_chore("Dishes", "", 15, Recurrence::Daily, None);
        let instance = schedule_instances(&[chore], tuesday()).remove(0);
        let now = Local.with_ymd_and_hms(2026, 3, 10, 17, 0, 0).unwrap();

        let rejected = reject(&submit_evidence(&instance, EvidenceKind::Video, None, now));
        assert_eq!(rejected.status, InstanceStatus::Rejected);

        let resubmitted =
            submit_evidence(&rejected, EvidenceKind::Photo, Some("media/take2.jpg"), now);
        assert_eq!(resubmitted.status, InstanceStatus::Submitted);
        assert_eq!(resubmitted.evidence.unwrap().reference, "media/take2.jpg");
    }

    #[test]
    fn approve_is_idempotent() {
        let chore = create_chore("Dishes", "", 15, Recurrence::Daily, None);
        let instance = schedule_instances(&[chore], tuesday()).remove(0);

        let once = approve(&instance);
        let twice = approve(&once);
        assert_eq!(once.status, InstanceStatus::Approved);
        assert_eq!(once, twice);
    }
}
