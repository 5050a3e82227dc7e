use crate::calendar::ServiceCalendar;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// How far ahead a due date may fall and still count as upcoming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpcomingHorizon {
    /// Through the end of the current local calendar month.
    #[default]
    EndOfMonth,
    /// A fixed number of days after `now`, inclusive.
    Days(u32),
}

/// Every tunable that feeds classification. One value is shared by all predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationPolicy {
    /// Offset of the business's local time, in minutes east of UTC.
    pub utc_offset_minutes: i32,
    pub week_start: Weekday,
    /// A work order younger than this is new.
    pub new_window_days: i64,
    pub upcoming_horizon: UpcomingHorizon,
    /// Lateness interval for cadences that are missing or not recognised.
    pub default_interval_days: i64,
    /// Extra cadence steps tried when projecting a suggested date.
    pub max_suggestion_steps: u32,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            week_start: Weekday::Sun,
            new_window_days: 7,
            upcoming_horizon: UpcomingHorizon::EndOfMonth,
            default_interval_days: 7,
            max_suggestion_steps: 10,
        }
    }
}

impl ClassificationPolicy {
    pub fn with_upcoming_horizon(mut self, horizon: UpcomingHorizon) -> Self {
        self.upcoming_horizon = horizon;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn calendar(&self) -> ServiceCalendar {
        ServiceCalendar::with_offset_minutes(self.utc_offset_minutes, self.week_start)
    }
}
