//! Time utilities for latch
//!
//! Wall-clock time drives everything here: the unlock window is a recurring
//! daily interval expressed in minutes since midnight, and "today" always
//! means the local calendar day.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `LATCH_MOCK_TIME` environment variable overrides the
//! system time for all time-sensitive operations, advancing at the real
//! rate from the given starting point. Format: `YYYY-MM-DD HH:MM:SS`.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "LATCH_MOCK_TIME";

/// Last representable minute of a day (23:59)
pub const MAX_MINUTE_OF_DAY: u32 = 23 * 60 + 59;

/// Offset between mock time and real time at process start.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let mock_time_str = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let naive = NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S")
                .inspect_err(|_| {
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        expected_format = "%Y-%m-%d %H:%M:%S",
                        "Invalid mock time format"
                    );
                })
                .ok()?;
            let mock_dt = Local.from_local_datetime(&naive).single()?;
            let offset = mock_dt.signed_duration_since(Local::now());
            tracing::info!(
                mock_time = %mock_time_str,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Get the current local time, respecting mock time settings in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();
    match mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Reduce a local datetime to minutes since midnight, in [0, 1439].
pub fn minutes_since_midnight(dt: &DateTime<Local>) -> u32 {
    (dt.hour() * 60 + dt.minute()).min(MAX_MINUTE_OF_DAY)
}

/// Format a minute-of-day as a 12-hour clock label, e.g. `"6:00 PM"`.
pub fn clock_label(minute_of_day: u32) -> String {
    let minute_of_day = minute_of_day.min(MAX_MINUTE_OF_DAY);
    let (hour, minute) = (minute_of_day / 60, minute_of_day % 60);
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour12, minute, meridiem)
}

/// A recurring daily time-of-day interval, possibly spanning midnight.
///
/// Bounds are minutes since midnight, normalized into [0, 1439] on
/// construction. Membership is half-open: `[start, end)`. A window with
/// `start == end` is empty and never matches (degenerate-window policy,
/// not an error). `start > end` wraps past midnight, e.g. 22:00-06:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWindow {
    start_minutes: u32,
    end_minutes: u32,
}

impl DailyWindow {
    pub fn new(start_minutes: u32, end_minutes: u32) -> Self {
        Self {
            start_minutes: start_minutes.min(MAX_MINUTE_OF_DAY),
            end_minutes: end_minutes.min(MAX_MINUTE_OF_DAY),
        }
    }

    pub fn start_minutes(&self) -> u32 {
        self.start_minutes
    }

    pub fn end_minutes(&self) -> u32 {
        self.end_minutes
    }

    /// Check if the given local datetime falls within this window.
    pub fn contains(&self, dt: &DateTime<Local>) -> bool {
        self.contains_minute(minutes_since_midnight(dt))
    }

    /// Window membership for a minute-of-day value.
    pub fn contains_minute(&self, minute_of_day: u32) -> bool {
        let now = minute_of_day.min(MAX_MINUTE_OF_DAY);
        if self.start_minutes == self.end_minutes {
            return false;
        }
        if self.start_minutes < self.end_minutes {
            now >= self.start_minutes && now < self.end_minutes
        } else {
            // Window crosses midnight (e.g., 22:00 - 06:00)
            now >= self.start_minutes || now < self.end_minutes
        }
    }

    /// Clock label for the window's opening time, e.g. `"6:00 PM"`.
    pub fn start_label(&self) -> String {
        clock_label(self.start_minutes)
    }
}
