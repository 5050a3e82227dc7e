use crate::classifier::{Classifier, StatusBucket};
use crate::work_order::{ActivityStatus, Frequency, WorkOrder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    NextDue,
    Name,
    Created,
}

impl SortField {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "next_due" | "nextdue" | "due" => Some(SortField::NextDue),
            "name" => Some(SortField::Name),
            "created" | "created_date" => Some(SortField::Created),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Search, bucket, cadence and activity criteria applied to the visible list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkOrderQuery {
    pub search_text: Option<String>,
    pub bucket: Option<StatusBucket>,
    pub cadence: Option<Frequency>,
    pub activity_date_from: Option<NaiveDate>,
    pub activity_date_to: Option<NaiveDate>,
    pub activity_status: Option<ActivityStatus>,
    pub sort: Option<(SortField, SortOrder)>,
}

impl WorkOrderQuery {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, classifier: &Classifier, work_order: &WorkOrder, now: DateTime<Utc>) -> bool {
        self.matches_search(work_order)
            && self
                .bucket
                .is_none_or(|bucket| bucket_matches(classifier, work_order, bucket, now))
            && self
                .cadence
                .is_none_or(|cadence| work_order.schedule.frequency() == Some(cadence))
            && self.matches_activity(classifier, work_order)
    }

    /// Filters then sorts. Input order is kept for ties.
    pub fn apply<'a>(
        &self,
        classifier: &Classifier,
        work_orders: &'a [WorkOrder],
        now: DateTime<Utc>,
    ) -> Vec<&'a WorkOrder> {
        let mut visible: Vec<&WorkOrder> = work_orders
            .iter()
            .filter(|work_order| self.matches(classifier, work_order, now))
            .collect();
        if let Some((field, order)) = self.sort {
            sort_work_orders(classifier, &mut visible, field, order);
        }
        visible
    }

    fn matches_search(&self, work_order: &WorkOrder) -> bool {
        let Some(term) = self.search_text.as_deref().map(str::trim) else {
            return true;
        };
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        [&work_order.name, &work_order.description, &work_order.address]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_activity(&self, classifier: &Classifier, work_order: &WorkOrder) -> bool {
        if self.activity_date_from.is_none()
            && self.activity_date_to.is_none()
            && self.activity_status.is_none()
        {
            return true;
        }
        let calendar = classifier.calendar();
        work_order.activity.iter().any(|activity| {
            if self.activity_status.is_some_and(|status| activity.status != status) {
                return false;
            }
            if self.activity_date_from.is_none() && self.activity_date_to.is_none() {
                return true;
            }
            let Some(at) = activity.occurred_at(calendar.offset()) else {
                return false;
            };
            let date = calendar.local_date(at);
            self.activity_date_from.is_none_or(|from| date >= from)
                && self.activity_date_to.is_none_or(|to| date <= to)
        })
    }
}

/// Flag semantics: a work order matches every bucket whose predicate holds.
pub fn bucket_matches(
    classifier: &Classifier,
    work_order: &WorkOrder,
    bucket: StatusBucket,
    now: DateTime<Utc>,
) -> bool {
    match bucket {
        StatusBucket::New => classifier.is_new(work_order, now),
        StatusBucket::Overdue => classifier.is_overdue(work_order, now),
        StatusBucket::DueThisWeek => classifier.is_due_this_week(work_order, now),
        StatusBucket::Upcoming => classifier.is_upcoming(work_order, now),
        StatusBucket::Pending => classifier.is_pending(&work_order.schedule),
        StatusBucket::Unscheduled => {
            classifier.primary_bucket(work_order, now) == StatusBucket::Unscheduled
        }
    }
}

/// Sorts in place. Missing or unreadable dates go last in either direction.
pub fn sort_work_orders(
    classifier: &Classifier,
    work_orders: &mut [&WorkOrder],
    field: SortField,
    order: SortOrder,
) {
    let offset = classifier.calendar().offset();
    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };
    let by_date = |a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>| match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    match field {
        SortField::NextDue => {
            work_orders.sort_by(|a, b| by_date(a.next_due_at(offset), b.next_due_at(offset)))
        }
        SortField::Created => {
            work_orders.sort_by(|a, b| by_date(a.created_at(offset), b.created_at(offset)))
        }
        SortField::Name => work_orders
            .sort_by(|a, b| directed(a.name.to_lowercase().cmp(&b.name.to_lowercase()))),
    }
}
