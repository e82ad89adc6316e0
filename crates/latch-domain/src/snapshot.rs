//! The persisted household aggregate
//!
//! A snapshot is the whole shared state, encoded as one JSON blob. Decoding
//! is lenient: every optional field falls back to a documented default
//! independently, so old or partially-written snapshots still load. Only a
//! structurally invalid blob is treated as absent (cold start).

use serde::{Deserialize, Serialize};

use crate::{
    Chore, ChoreInstance, ChildProfile, LearningGoal, ManualOverride, Role, RuleSet,
};

/// Serialized household aggregate shared between the parent and child views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdSnapshot {
    #[serde(default, deserialize_with = "lenient::role_or_parent")]
    pub active_role: Role,
    pub child_profile: ChildProfile,
    pub chores: Vec<Chore>,
    pub chore_instances: Vec<ChoreInstance>,
    pub learning_goals: Vec<LearningGoal>,
    #[serde(default, deserialize_with = "lenient::rule_set_or_default")]
    pub rule_set: RuleSet,
    #[serde(default, deserialize_with = "lenient::override_or_none")]
    pub parent_override: ManualOverride,
}

/// Per-field fallback table for snapshot decoding.
///
/// Each helper deserializes the raw value and substitutes the documented
/// default when the field is malformed; `#[serde(default)]` on the field
/// covers the missing case. Defaults:
///
/// | field                          | fallback        |
/// |--------------------------------|-----------------|
/// | chore `details`                | `""`            |
/// | chore `points`                 | `0`             |
/// | chore `due_date`               | none            |
/// | instance `submitted_at`        | none            |
/// | instance `evidence`            | none            |
/// | goal `progress_seconds`        | `0`             |
/// | profile `age`                  | `0`             |
/// | `required_daily_xp`            | `0`             |
/// | `unlock_window_start_minutes`  | `1080` (18:00)  |
/// | `unlock_window_end_minutes`    | `1200` (20:00)  |
/// | `rule_set`                     | built-in default|
/// | `parent_override`              | none            |
/// | `active_role`                  | parent          |
pub(crate) mod lenient {
    use chrono::{DateTime, Local, NaiveDate};
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};

    use crate::{
        DEFAULT_WINDOW_END_MINUTES, DEFAULT_WINDOW_START_MINUTES, Evidence, ManualOverride,
        Role, RuleSet,
    };

    fn or_else<'de, D, T>(deserializer: D, fallback: impl FnOnce() -> T) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).unwrap_or_else(|_| fallback()))
    }

    pub fn string_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        or_else(d, String::new)
    }

    pub fn u8_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        or_else(d, || 0)
    }

    pub fn u32_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        or_else(d, || 0)
    }

    pub fn u64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        or_else(d, || 0)
    }

    pub fn date_or_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        or_else(d, || None)
    }

    pub fn datetime_or_none<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Local>>, D::Error> {
        or_else(d, || None)
    }

    pub fn evidence_or_none<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Evidence>, D::Error> {
        or_else(d, || None)
    }

    pub fn window_start<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        or_else(d, || DEFAULT_WINDOW_START_MINUTES)
    }

    pub fn window_end<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        or_else(d, || DEFAULT_WINDOW_END_MINUTES)
    }

    pub fn override_or_none<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<ManualOverride, D::Error> {
        or_else(d, || ManualOverride::None)
    }

    pub fn role_or_parent<'de, D: Deserializer<'de>>(d: D) -> Result<Role, D::Error> {
        or_else(d, || Role::Parent)
    }

    pub fn rule_set_or_default<'de, D: Deserializer<'de>>(d: D) -> Result<RuleSet, D::Error> {
        or_else(d, RuleSet::default)
    }
}
