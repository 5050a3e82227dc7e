use crate::timestamp::local_to_utc;
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc, Weekday,
};

/// Local calendar used to turn an instant into week and month windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceCalendar {
    offset: FixedOffset,
    week_start: Weekday,
}

impl Default for ServiceCalendar {
    fn default() -> Self {
        Self::new(Utc.fix(), Weekday::Sun)
    }
}

impl ServiceCalendar {
    pub fn new(offset: FixedOffset, week_start: Weekday) -> Self {
        Self { offset, week_start }
    }

    /// Builds a calendar from an offset in minutes east of UTC. Out-of-range offsets fall back to UTC.
    pub fn with_offset_minutes(minutes: i32, week_start: Weekday) -> Self {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self::new(offset, week_start)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        local_to_utc(date.and_time(NaiveTime::MIN), self.offset)
    }

    /// Most recent week-start day on or before the local date of `instant`.
    pub fn week_start_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        let date = self.local_date(instant);
        let back = (date.weekday().num_days_from_monday() + 7
            - self.week_start.num_days_from_monday())
            % 7;
        date - Duration::days(i64::from(back))
    }

    /// Current calendar week as a half-open range `[start, end)`.
    pub fn week_bounds(&self, instant: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start_of_day(self.week_start_date(instant))?;
        Some((start, start + Duration::days(7)))
    }

    pub fn in_week_of(&self, candidate: DateTime<Utc>, instant: DateTime<Utc>) -> bool {
        self.week_bounds(instant)
            .is_some_and(|(start, end)| candidate >= start && candidate < end)
    }

    pub fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
        if date.month() == 12 {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
        }
    }

    pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
        Self::first_of_next_month(date).and_then(|next| next.pred_opt())
    }

    /// Exclusive end of the local calendar month containing `instant`.
    pub fn month_end(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Self::first_of_next_month(self.local_date(instant))
            .and_then(|first| self.start_of_day(first))
    }
}
