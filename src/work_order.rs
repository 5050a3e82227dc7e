use crate::timestamp;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome recorded on a service visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityStatus {
    Completed,
    #[default]
    Incomplete,
    Canceled,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Completed => "completed",
            ActivityStatus::Incomplete => "incomplete",
            ActivityStatus::Canceled => "canceled",
        }
    }

    /// Maps the spellings found in older data sets onto the canonical set.
    /// Unrecognised values are treated as not yet done.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "completed" | "complete" | "done" => ActivityStatus::Completed,
            "canceled" | "cancelled" => ActivityStatus::Canceled,
            _ => ActivityStatus::Incomplete,
        }
    }
}

impl From<String> for ActivityStatus {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<ActivityStatus> for String {
    fn from(value: ActivityStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nominal recurrence cadence of a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    Annually,
}

/// How a cadence advances a date: by fixed days or by calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceStep {
    Days(i64),
    Months(u32),
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::BiWeekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Annually,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "bi-weekly" | "biweekly" | "bi_weekly" => Some(Frequency::BiWeekly),
            "monthly" => Some(Frequency::Monthly),
            "quarterly" => Some(Frequency::Quarterly),
            "annually" | "annual" | "yearly" => Some(Frequency::Annually),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annually => "annually",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::BiWeekly => "Bi-Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Annually => "Annual",
        }
    }

    /// Interval used to judge lateness from activity history.
    pub fn interval_days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::BiWeekly => 14,
            Frequency::Monthly => 30,
            Frequency::Quarterly => 90,
            Frequency::Annually => 365,
        }
    }

    /// Interval used when projecting the next visit onto the calendar.
    pub fn cadence_step(&self) -> CadenceStep {
        match self {
            Frequency::Daily => CadenceStep::Days(1),
            Frequency::Weekly => CadenceStep::Days(7),
            Frequency::BiWeekly => CadenceStep::Days(14),
            Frequency::Monthly => CadenceStep::Months(1),
            Frequency::Quarterly => CadenceStep::Months(3),
            Frequency::Annually => CadenceStep::Months(12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed service windows. Informational; classification ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restrictions {
    pub weekends: bool,
    pub weekdays: bool,
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub morning_hours: bool,
    pub afternoon_hours: bool,
    pub business_hours: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Raw cadence tag as received; see [`Schedule::frequency`].
    #[serde(default, rename = "frequency")]
    pub frequency_raw: String,
    #[serde(
        default,
        rename = "nextDue",
        alias = "next_due",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_due: Option<String>,
    #[serde(default)]
    pub restrictions: Restrictions,
}

impl Schedule {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency_raw: frequency.as_str().to_string(),
            next_due: None,
            restrictions: Restrictions::default(),
        }
    }

    pub fn with_next_due(mut self, next_due: impl Into<String>) -> Self {
        self.next_due = Some(next_due.into());
        self
    }

    pub fn frequency(&self) -> Option<Frequency> {
        Frequency::from_str(&self.frequency_raw)
    }

    pub fn has_frequency(&self) -> bool {
        !self.frequency_raw.trim().is_empty()
    }

    /// No next-due date has been assigned yet.
    pub fn is_pending(&self) -> bool {
        timestamp::is_blank(self.next_due.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub technician: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ActivityStatus,
}

impl Activity {
    pub fn new(id: impl Into<String>, date: impl Into<String>, status: ActivityStatus) -> Self {
        Self {
            id: id.into(),
            kind: String::new(),
            date: date.into(),
            technician: String::new(),
            notes: None,
            status,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ActivityStatus::Completed
    }

    pub fn occurred_at(&self, offset: FixedOffset) -> Option<DateTime<Utc>> {
        timestamp::parse_timestamp(&self.date, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPreference {
    Sms,
    Voice,
    Email,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, rename = "sms-enabled")]
    pub sms_enabled: bool,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phones: Vec<Phone>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub preference: ContactPreference,
    #[serde(default)]
    pub primary: bool,
}

impl Contact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Marks one phone as primary and clears the flag on the others.
    pub fn set_primary_phone(&mut self, index: usize) -> bool {
        if index >= self.phones.len() {
            return false;
        }
        for (idx, phone) in self.phones.iter_mut().enumerate() {
            phone.primary = idx == index;
        }
        true
    }

    pub fn primary_phone(&self) -> Option<&Phone> {
        self.phones
            .iter()
            .find(|phone| phone.primary)
            .or_else(|| self.phones.first())
    }

    /// One-line phone description shown in the contact list.
    pub fn phone_summary(&self) -> String {
        let count = self.phones.len();
        if count == 0 {
            return "No phone".to_string();
        }
        let suffix = if count == 1 { "" } else { "s" };
        let count_text = format!("{count} phone{suffix}");
        match self.phones.first().map(|phone| phone.phone.trim()) {
            Some(number) if !number.is_empty() => format!("{count_text} • {number}"),
            _ => count_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    #[serde(rename = "uuid", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "created-date", alias = "createdDate")]
    pub created_date: String,
    #[serde(default)]
    pub activity: Vec<Activity>,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

impl WorkOrder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        created_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            address: String::new(),
            created_date: created_date.into(),
            activity: Vec::new(),
            schedule: Schedule::default(),
            contacts: Vec::new(),
        }
    }

    pub fn created_at(&self, offset: FixedOffset) -> Option<DateTime<Utc>> {
        timestamp::parse_timestamp(&self.created_date, offset)
    }

    pub fn next_due_at(&self, offset: FixedOffset) -> Option<DateTime<Utc>> {
        timestamp::parse_optional(self.schedule.next_due.as_deref(), offset)
    }

    /// Activities with a readable date, newest first. Storage order is not trusted.
    pub fn dated_activities(&self, offset: FixedOffset) -> Vec<(&Activity, DateTime<Utc>)> {
        let mut dated: Vec<(&Activity, DateTime<Utc>)> = self
            .activity
            .iter()
            .filter_map(|activity| activity.occurred_at(offset).map(|at| (activity, at)))
            .collect();
        dated.sort_by(|a, b| b.1.cmp(&a.1));
        dated
    }

    pub fn most_recent_activity(&self, offset: FixedOffset) -> Option<&Activity> {
        self.dated_activities(offset)
            .first()
            .map(|(activity, _)| *activity)
    }

    pub fn most_recent_completed_activity(&self, offset: FixedOffset) -> Option<&Activity> {
        self.dated_activities(offset)
            .into_iter()
            .find(|(activity, _)| activity.is_completed())
            .map(|(activity, _)| activity)
    }

    /// Date of the latest completed activity, optionally ignoring anything after `not_after`.
    pub fn last_completed_at(
        &self,
        offset: FixedOffset,
        not_after: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        self.dated_activities(offset)
            .into_iter()
            .filter(|(activity, _)| activity.is_completed())
            .map(|(_, at)| at)
            .find(|at| not_after.is_none_or(|limit| *at <= limit))
    }

    pub fn has_completed_activity(&self) -> bool {
        self.activity.iter().any(Activity::is_completed)
    }

    pub fn primary_contact(&self) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.primary)
    }

    /// Adds a contact; the first contact on a work order becomes primary.
    pub fn add_contact(&mut self, mut contact: Contact) {
        if self.contacts.is_empty() {
            contact.primary = true;
        } else if contact.primary {
            for existing in &mut self.contacts {
                existing.primary = false;
            }
        }
        self.contacts.push(contact);
    }

    pub fn set_primary_contact(&mut self, index: usize) -> bool {
        if index >= self.contacts.len() {
            return false;
        }
        for (idx, contact) in self.contacts.iter_mut().enumerate() {
            contact.primary = idx == index;
        }
        true
    }

    /// Removes a contact. When the primary contact goes, the first remaining one is promoted.
    pub fn remove_contact(&mut self, index: usize) -> Option<Contact> {
        if index >= self.contacts.len() {
            return None;
        }
        let removed = self.contacts.remove(index);
        if removed.primary {
            if let Some(first) = self.contacts.first_mut() {
                first.primary = true;
            }
        }
        Some(removed)
    }
}
