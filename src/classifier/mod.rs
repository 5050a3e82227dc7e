//! Schedule classification of work orders.
//!
//! A work order is judged in one of two ways. When `schedule.nextDue` carries a value
//! the due date drives every answer; when it is blank the activity history and the
//! service cadence do. [`Classifier::scheduling_mode`] makes that choice once and every
//! predicate follows it, so a single record is never judged by a mix of both.
//!
//! All functions take the evaluation instant explicitly and never fail: unreadable
//! dates make a predicate answer `false`.

pub mod policy;
pub mod suggestion;

use crate::calendar::ServiceCalendar;
use crate::work_order::{CadenceStep, Schedule, WorkOrder};
use chrono::{DateTime, Duration, Months, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use policy::{ClassificationPolicy, UpcomingHorizon};
pub use suggestion::{Suggestion, SuggestionUnavailable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMode {
    /// `schedule.nextDue` is populated.
    DueDate,
    /// No due date; lateness comes from completed activity and cadence.
    ActivityHistory,
}

/// The single status chip shown for a work order.
///
/// Buckets are checked in declaration order and the first match wins, so every
/// work order lands in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    New,
    Overdue,
    #[serde(rename = "this_week")]
    DueThisWeek,
    Upcoming,
    Pending,
    Unscheduled,
}

impl StatusBucket {
    pub const ALL: [StatusBucket; 6] = [
        StatusBucket::New,
        StatusBucket::Overdue,
        StatusBucket::DueThisWeek,
        StatusBucket::Upcoming,
        StatusBucket::Pending,
        StatusBucket::Unscheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBucket::New => "new",
            StatusBucket::Overdue => "overdue",
            StatusBucket::DueThisWeek => "this_week",
            StatusBucket::Upcoming => "upcoming",
            StatusBucket::Pending => "pending",
            StatusBucket::Unscheduled => "unscheduled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Some(StatusBucket::New),
            "overdue" => Some(StatusBucket::Overdue),
            "this_week" | "thisweek" | "this-week" | "week" => Some(StatusBucket::DueThisWeek),
            "upcoming" | "this_month" | "month" => Some(StatusBucket::Upcoming),
            "pending" => Some(StatusBucket::Pending),
            "unscheduled" | "none" => Some(StatusBucket::Unscheduled),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusBucket::New => "New",
            StatusBucket::Overdue => "Overdue",
            StatusBucket::DueThisWeek => "This Week",
            StatusBucket::Upcoming => "This Month",
            StatusBucket::Pending => "Pending",
            StatusBucket::Unscheduled => "Unscheduled",
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every answer for one work order, computed against the same instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub work_order_id: String,
    pub mode: SchedulingMode,
    pub bucket: StatusBucket,
    pub is_new: bool,
    pub is_pending: bool,
    pub is_overdue: bool,
    pub is_due_this_week: bool,
    pub is_upcoming: bool,
    pub suggestion: Suggestion,
}

impl Classification {
    pub fn has_flag(&self, bucket: StatusBucket) -> bool {
        match bucket {
            StatusBucket::New => self.is_new,
            StatusBucket::Overdue => self.is_overdue,
            StatusBucket::DueThisWeek => self.is_due_this_week,
            StatusBucket::Upcoming => self.is_upcoming,
            StatusBucket::Pending => self.is_pending,
            StatusBucket::Unscheduled => self.bucket == StatusBucket::Unscheduled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    policy: ClassificationPolicy,
    calendar: ServiceCalendar,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassificationPolicy::default())
    }
}

impl Classifier {
    pub fn new(policy: ClassificationPolicy) -> Self {
        let calendar = policy.calendar();
        Self { policy, calendar }
    }

    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    pub fn calendar(&self) -> &ServiceCalendar {
        &self.calendar
    }

    pub fn scheduling_mode(&self, work_order: &WorkOrder) -> SchedulingMode {
        if work_order.schedule.is_pending() {
            SchedulingMode::ActivityHistory
        } else {
            SchedulingMode::DueDate
        }
    }

    /// Created less than `new_window_days` before `now`.
    pub fn is_new(&self, work_order: &WorkOrder, now: DateTime<Utc>) -> bool {
        work_order
            .created_at(self.calendar.offset())
            .is_some_and(|created| now - created < Duration::days(self.policy.new_window_days))
    }

    /// No next-due date assigned: absent and whitespace-only values are the same thing.
    pub fn is_pending(&self, schedule: &Schedule) -> bool {
        schedule.is_pending()
    }

    /// Late relative to the due date, or, without one, more than one cadence
    /// interval past the last completed visit at or before `now`. Exactly one
    /// interval is still on time.
    pub fn is_overdue(&self, work_order: &WorkOrder, now: DateTime<Utc>) -> bool {
        match self.scheduling_mode(work_order) {
            SchedulingMode::DueDate => self.next_due(work_order).is_some_and(|due| due < now),
            SchedulingMode::ActivityHistory => {
                let interval = Duration::days(self.interval_days(work_order));
                match work_order.last_completed_at(self.calendar.offset(), Some(now)) {
                    Some(last) => now - last > interval,
                    None => true,
                }
            }
        }
    }

    /// Due inside the current local calendar week. Without a due date, an open
    /// (not completed) activity dated this week counts instead.
    pub fn is_due_this_week(&self, work_order: &WorkOrder, now: DateTime<Utc>) -> bool {
        match self.scheduling_mode(work_order) {
            SchedulingMode::DueDate => self
                .next_due(work_order)
                .is_some_and(|due| self.calendar.in_week_of(due, now)),
            SchedulingMode::ActivityHistory => work_order
                .activity
                .iter()
                .filter(|activity| !activity.is_completed())
                .filter_map(|activity| activity.occurred_at(self.calendar.offset()))
                .any(|at| self.calendar.in_week_of(at, now)),
        }
    }

    /// Due strictly after `now` and no later than the configured horizon.
    pub fn is_upcoming(&self, work_order: &WorkOrder, now: DateTime<Utc>) -> bool {
        if self.scheduling_mode(work_order) != SchedulingMode::DueDate {
            return false;
        }
        let Some(due) = self.next_due(work_order) else {
            return false;
        };
        if due <= now {
            return false;
        }
        match self.policy.upcoming_horizon {
            UpcomingHorizon::EndOfMonth => self
                .calendar
                .month_end(now)
                .is_some_and(|month_end| due < month_end),
            // A horizon past the representable range has no upper bound.
            UpcomingHorizon::Days(days) => now
                .checked_add_signed(Duration::days(i64::from(days)))
                .is_none_or(|end| due <= end),
        }
    }

    /// Projects the next visit one cadence step after the last completed activity,
    /// stepping forward until the date is in the future.
    pub fn suggested_next_date(
        &self,
        work_order: &WorkOrder,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, SuggestionUnavailable> {
        if work_order.activity.is_empty() {
            return Err(SuggestionUnavailable::NoActivity);
        }
        if !work_order.schedule.has_frequency() {
            return Err(SuggestionUnavailable::NoFrequency);
        }
        let last = work_order
            .last_completed_at(self.calendar.offset(), Some(now))
            .ok_or(SuggestionUnavailable::NoCompletedActivity)?;
        let frequency = work_order.schedule.frequency().ok_or_else(|| {
            SuggestionUnavailable::UnknownFrequency(work_order.schedule.frequency_raw.clone())
        })?;

        let step = frequency.cadence_step();
        let limit = self.policy.max_suggestion_steps;
        let mut candidate = self
            .advance(last, step)
            .ok_or(SuggestionUnavailable::StepLimitExceeded(limit))?;
        let mut steps = 0;
        while candidate <= now {
            if steps >= limit {
                return Err(SuggestionUnavailable::StepLimitExceeded(limit));
            }
            candidate = self
                .advance(candidate, step)
                .ok_or(SuggestionUnavailable::StepLimitExceeded(limit))?;
            steps += 1;
        }
        Ok(candidate)
    }

    pub fn primary_bucket(&self, work_order: &WorkOrder, now: DateTime<Utc>) -> StatusBucket {
        self.classify(work_order, now).bucket
    }

    pub fn classify(&self, work_order: &WorkOrder, now: DateTime<Utc>) -> Classification {
        let is_new = self.is_new(work_order, now);
        let is_pending = self.is_pending(&work_order.schedule);
        let is_overdue = self.is_overdue(work_order, now);
        let is_due_this_week = self.is_due_this_week(work_order, now);
        let is_upcoming = self.is_upcoming(work_order, now);

        let bucket = if is_new {
            StatusBucket::New
        } else if is_overdue {
            StatusBucket::Overdue
        } else if is_due_this_week {
            StatusBucket::DueThisWeek
        } else if is_upcoming {
            StatusBucket::Upcoming
        } else if is_pending {
            StatusBucket::Pending
        } else {
            StatusBucket::Unscheduled
        };

        Classification {
            work_order_id: work_order.id.clone(),
            mode: self.scheduling_mode(work_order),
            bucket,
            is_new,
            is_pending,
            is_overdue,
            is_due_this_week,
            is_upcoming,
            suggestion: self.suggested_next_date(work_order, now).into(),
        }
    }

    /// Classifies a batch in input order. Records are independent, so the work is spread across threads.
    pub fn classify_all(&self, work_orders: &[WorkOrder], now: DateTime<Utc>) -> Vec<Classification> {
        work_orders
            .par_iter()
            .map(|work_order| self.classify(work_order, now))
            .collect()
    }

    fn next_due(&self, work_order: &WorkOrder) -> Option<DateTime<Utc>> {
        work_order.next_due_at(self.calendar.offset())
    }

    fn interval_days(&self, work_order: &WorkOrder) -> i64 {
        work_order
            .schedule
            .frequency()
            .map(|frequency| frequency.interval_days())
            .unwrap_or(self.policy.default_interval_days)
    }

    fn advance(&self, instant: DateTime<Utc>, step: CadenceStep) -> Option<DateTime<Utc>> {
        match step {
            CadenceStep::Days(days) => instant.checked_add_signed(Duration::days(days)),
            CadenceStep::Months(months) => instant
                .with_timezone(&self.calendar.offset())
                .checked_add_months(Months::new(months))
                .map(|local| local.with_timezone(&Utc)),
        }
    }
}
