use crate::classifier::{Classifier, Suggestion};
use crate::error::PortalResult;
use crate::work_order::WorkOrder;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

pub const DASHBOARD_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "address",
    "frequency",
    "next_due",
    "status",
    "suggested_next",
];

/// One dashboard line: a work order plus its classification, dates as local `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRow {
    pub id: String,
    pub name: String,
    pub address: String,
    pub frequency: String,
    pub next_due: Option<String>,
    pub status: String,
    pub suggested_next: Option<String>,
}

pub fn dashboard_rows(
    classifier: &Classifier,
    work_orders: &[WorkOrder],
    now: DateTime<Utc>,
) -> Vec<DashboardRow> {
    let calendar = classifier.calendar();
    let classifications = classifier.classify_all(work_orders, now);
    work_orders
        .iter()
        .zip(classifications)
        .map(|(work_order, classification)| {
            let frequency = match work_order.schedule.frequency() {
                Some(frequency) => frequency.as_str().to_string(),
                None => work_order.schedule.frequency_raw.trim().to_string(),
            };
            // Unreadable due dates are shown as received so bad data stays visible.
            let next_due = match work_order.next_due_at(calendar.offset()) {
                Some(due) => Some(calendar.local_date(due).to_string()),
                None if work_order.schedule.is_pending() => None,
                None => work_order
                    .schedule
                    .next_due
                    .as_deref()
                    .map(|raw| raw.trim().to_string()),
            };
            let suggested_next = match classification.suggestion {
                Suggestion::Available { date } => Some(calendar.local_date(date).to_string()),
                Suggestion::Unavailable { .. } => None,
            };
            DashboardRow {
                id: work_order.id.clone(),
                name: work_order.name.clone(),
                address: work_order.address.clone(),
                frequency,
                next_due,
                status: classification.bucket.as_str().to_string(),
                suggested_next,
            }
        })
        .collect()
}

pub fn dashboard_frame(
    classifier: &Classifier,
    work_orders: &[WorkOrder],
    now: DateTime<Utc>,
) -> PortalResult<DataFrame> {
    rows_to_frame(&dashboard_rows(classifier, work_orders, now))
}

pub fn rows_to_frame(rows: &[DashboardRow]) -> PortalResult<DataFrame> {
    let text = |name: &'static str, pick: fn(&DashboardRow) -> &str| {
        let values: Vec<&str> = rows.iter().map(pick).collect();
        Series::new(PlSmallStr::from_static(name), values).into_column()
    };
    let optional = |name: &'static str, pick: fn(&DashboardRow) -> Option<&str>| {
        let values: Vec<Option<&str>> = rows.iter().map(pick).collect();
        Series::new(PlSmallStr::from_static(name), values).into_column()
    };

    let columns = vec![
        text("id", |row| row.id.as_str()),
        text("name", |row| row.name.as_str()),
        text("address", |row| row.address.as_str()),
        text("frequency", |row| row.frequency.as_str()),
        optional("next_due", |row| row.next_due.as_deref()),
        text("status", |row| row.status.as_str()),
        optional("suggested_next", |row| row.suggested_next.as_deref()),
    ];
    Ok(DataFrame::new(columns)?)
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Boxed plain-text table for terminal output.
pub fn render_frame_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect::<Vec<_>>();
        cells.push(row);
    }

    let mut widths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let line = |values: &[String]| {
        let mut out = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            out.push(' ');
            out.push_str(value);
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&line(&names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

#[derive(Serialize)]
struct DashboardCsvRecord<'a> {
    id: &'a str,
    name: &'a str,
    address: &'a str,
    frequency: &'a str,
    next_due: &'a str,
    status: &'a str,
    suggested_next: &'a str,
}

impl<'a> From<&'a DashboardRow> for DashboardCsvRecord<'a> {
    fn from(row: &'a DashboardRow) -> Self {
        Self {
            id: &row.id,
            name: &row.name,
            address: &row.address,
            frequency: &row.frequency,
            next_due: row.next_due.as_deref().unwrap_or(""),
            status: &row.status,
            suggested_next: row.suggested_next.as_deref().unwrap_or(""),
        }
    }
}

/// Writes the dashboard view to CSV and returns the number of data rows written.
pub fn export_dashboard_csv<P: AsRef<Path>>(
    classifier: &Classifier,
    work_orders: &[WorkOrder],
    now: DateTime<Utc>,
    path: P,
) -> PortalResult<usize> {
    let rows = dashboard_rows(classifier, work_orders, now);
    let file = File::create(path)?;
    let mut writer = ::csv::Writer::from_writer(file);
    if rows.is_empty() {
        writer.write_record(DASHBOARD_COLUMNS)?;
    }
    for row in &rows {
        writer.serialize(DashboardCsvRecord::from(row))?;
    }
    writer.flush()?;
    Ok(rows.len())
}
