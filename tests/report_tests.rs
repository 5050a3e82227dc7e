use chrono::{DateTime, TimeZone, Utc};
use tempfile::NamedTempFile;
use work_order_portal::report::{DASHBOARD_COLUMNS, dashboard_rows};
use work_order_portal::{
    Classifier, WorkOrder, WorkOrderStore, dashboard_frame, export_dashboard_csv,
    render_frame_as_text_table,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 3, 12, 0, 0).unwrap()
}

fn bundled() -> Vec<WorkOrder> {
    let mut store = WorkOrderStore::bundled();
    store.refresh().expect("bundled data loads");
    store.work_orders().to_vec()
}

#[test]
fn rows_carry_status_and_local_dates() {
    let rows = dashboard_rows(&Classifier::default(), &bundled(), now());
    let first = &rows[0];
    assert_eq!(first.status, "this_week");
    assert_eq!(first.next_due.as_deref(), Some("2025-07-05"));
    assert_eq!(first.suggested_next.as_deref(), Some("2025-07-07"));

    let brand_new = rows.iter().find(|row| row.id == "wo-n3w0rd3r1").unwrap();
    assert_eq!(brand_new.status, "new");
    assert_eq!(brand_new.frequency, "annually");
    assert_eq!(brand_new.next_due, None);
    assert_eq!(brand_new.suggested_next, None);
}

#[test]
fn unreadable_due_date_is_shown_as_received() {
    let mut work_order = WorkOrder::new("x", "Odd", "2025-01-01");
    work_order.schedule.next_due = Some(" whenever ".to_string());
    let rows = dashboard_rows(&Classifier::default(), &[work_order], now());
    assert_eq!(rows[0].next_due.as_deref(), Some("whenever"));
    assert_eq!(rows[0].status, "unscheduled");
}

#[test]
fn frame_has_dashboard_columns() {
    let df = dashboard_frame(&Classifier::default(), &bundled(), now()).unwrap();
    assert_eq!(df.height(), 8);
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, DASHBOARD_COLUMNS);

    let status = df.column("status").unwrap().str().unwrap();
    assert_eq!(status.get(2), Some("overdue"));
    let next_due = df.column("next_due").unwrap().str().unwrap();
    assert_eq!(next_due.get(2), None);
}

#[test]
fn text_table_includes_header_and_rows() {
    let df = dashboard_frame(&Classifier::default(), &bundled(), now()).unwrap();
    let table = render_frame_as_text_table(&df);
    let lines: Vec<&str> = table.lines().collect();
    assert!(lines[0].starts_with("+-"));
    assert!(lines[1].contains("| id "));
    assert!(lines[1].contains("suggested_next"));
    assert!(table.contains("wo-h2j4k6l8m"));
    // border, header, border, 8 rows, border
    assert_eq!(lines.len(), 12);
    let width = lines[0].chars().count();
    assert!(lines.iter().all(|line| line.chars().count() == width));
}

#[test]
fn export_writes_header_and_one_row_per_work_order() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let written =
        export_dashboard_csv(&Classifier::default(), &bundled(), now(), tmp.path()).unwrap();
    assert_eq!(written, 8);

    let mut reader = csv::Reader::from_path(tmp.path()).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, DASHBOARD_COLUMNS);

    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 8);
    let pending = records
        .iter()
        .find(|record| &record[0] == "wo-r5t7y9u1i")
        .unwrap();
    assert_eq!(&pending[4], "");
    assert_eq!(&pending[5], "pending");
    assert_eq!(&pending[6], "2025-07-05");
}

#[test]
fn export_of_empty_list_still_has_header() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let written = export_dashboard_csv(&Classifier::default(), &[], now(), tmp.path()).unwrap();
    assert_eq!(written, 0);
    let text = std::fs::read_to_string(tmp.path()).unwrap();
    assert_eq!(
        text.trim(),
        "id,name,address,frequency,next_due,status,suggested_next"
    );
}
