use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use work_order_portal::{
    Activity, ActivityStatus, ClassificationPolicy, Classifier, Frequency, Schedule,
    SchedulingMode, StatusBucket, SuggestionUnavailable, UpcomingHorizon, WorkOrder,
};

fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
}

// Thursday; the Sunday-based week is [Jun 29, Jul 6).
fn now() -> DateTime<Utc> {
    at(2025, 7, 3, 12, 0, 0)
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339()
}

fn order(id: &str) -> WorkOrder {
    WorkOrder::new(id, format!("Order {id}"), "2025-01-01T00:00:00Z")
}

fn due(id: &str, frequency: Frequency, next_due: DateTime<Utc>) -> WorkOrder {
    let mut work_order = order(id);
    work_order.schedule = Schedule::new(frequency).with_next_due(iso(next_due));
    work_order
}

fn by_history(id: &str, frequency: &str, activity: Vec<Activity>) -> WorkOrder {
    let mut work_order = order(id);
    work_order.schedule.frequency_raw = frequency.to_string();
    work_order.activity = activity;
    work_order
}

fn completed(instant: DateTime<Utc>) -> Activity {
    Activity::new("act", iso(instant), ActivityStatus::Completed)
}

fn open(instant: DateTime<Utc>) -> Activity {
    Activity::new("act", iso(instant), ActivityStatus::Incomplete)
}

#[test]
fn new_window_is_strictly_less_than_seven_days() {
    let classifier = Classifier::default();
    let mut work_order = order("a");

    work_order.created_date = iso(now() - Duration::days(6));
    assert!(classifier.is_new(&work_order, now()));

    work_order.created_date = iso(now() - Duration::days(7));
    assert!(!classifier.is_new(&work_order, now()));

    work_order.created_date = "not a date".to_string();
    assert!(!classifier.is_new(&work_order, now()));
}

#[test]
fn pending_treats_absent_empty_and_whitespace_alike() {
    let classifier = Classifier::default();
    for next_due in [None, Some(""), Some("   ")] {
        let mut work_order = order("p");
        work_order.schedule.next_due = next_due.map(str::to_string);
        assert!(classifier.is_pending(&work_order.schedule));
        assert_eq!(
            classifier.scheduling_mode(&work_order),
            SchedulingMode::ActivityHistory
        );
    }

    let scheduled = due("s", Frequency::Weekly, now());
    assert!(!classifier.is_pending(&scheduled.schedule));
    assert_eq!(classifier.scheduling_mode(&scheduled), SchedulingMode::DueDate);
}

#[test]
fn due_date_overdue_is_strict() {
    let classifier = Classifier::default();
    assert!(classifier.is_overdue(&due("a", Frequency::Weekly, now() - Duration::seconds(1)), now()));
    assert!(!classifier.is_overdue(&due("b", Frequency::Weekly, now()), now()));
}

#[test]
fn activity_overdue_boundary_is_exclusive() {
    let classifier = Classifier::default();
    let on_time = by_history("a", "weekly", vec![completed(now() - Duration::days(7))]);
    let late = by_history(
        "b",
        "weekly",
        vec![completed(now() - Duration::days(7) - Duration::seconds(1))],
    );
    assert!(!classifier.is_overdue(&on_time, now()));
    assert!(classifier.is_overdue(&late, now()));
}

#[test]
fn activity_overdue_without_completed_history() {
    let classifier = Classifier::default();
    assert!(classifier.is_overdue(&by_history("a", "weekly", vec![]), now()));
    assert!(classifier.is_overdue(
        &by_history("b", "monthly", vec![open(now() - Duration::days(1))]),
        now()
    ));
}

#[test]
fn activity_overdue_uses_newest_completed_visit_regardless_of_order() {
    let classifier = Classifier::default();
    let work_order = by_history(
        "a",
        "bi-weekly",
        vec![
            completed(now() - Duration::days(40)),
            completed(now() - Duration::days(3)),
            completed(now() - Duration::days(20)),
        ],
    );
    assert!(!classifier.is_overdue(&work_order, now()));
}

#[test]
fn activity_overdue_ignores_completed_visits_dated_after_now() {
    let classifier = Classifier::default();
    let work_order = by_history(
        "a",
        "weekly",
        vec![
            completed(now() - Duration::days(10)),
            completed(now() + Duration::days(2)),
        ],
    );
    assert!(classifier.is_overdue(&work_order, now()));

    let only_future = by_history("b", "weekly", vec![completed(now() + Duration::days(1))]);
    assert!(classifier.is_overdue(&only_future, now()));
    assert_eq!(
        classifier.suggested_next_date(&only_future, now()),
        Err(SuggestionUnavailable::NoCompletedActivity)
    );
}

#[test]
fn unknown_frequency_falls_back_to_seven_days() {
    let classifier = Classifier::default();
    let recent = by_history("a", "fortnightly", vec![completed(now() - Duration::days(6))]);
    let stale = by_history("b", "", vec![completed(now() - Duration::days(8))]);
    assert!(!classifier.is_overdue(&recent, now()));
    assert!(classifier.is_overdue(&stale, now()));
}

#[test]
fn this_week_boundaries() {
    let classifier = Classifier::default();
    let saturday_night = due("a", Frequency::Weekly, at(2025, 7, 5, 23, 59, 59));
    let next_sunday = due("b", Frequency::Weekly, at(2025, 7, 6, 0, 0, 0));
    let this_sunday = due("c", Frequency::Weekly, at(2025, 6, 29, 0, 0, 0));
    let last_saturday = due("d", Frequency::Weekly, at(2025, 6, 28, 23, 59, 59));

    assert!(classifier.is_due_this_week(&saturday_night, now()));
    assert!(!classifier.is_due_this_week(&next_sunday, now()));
    assert!(classifier.is_due_this_week(&this_sunday, now()));
    assert!(!classifier.is_due_this_week(&last_saturday, now()));
}

#[test]
fn this_week_respects_configured_week_start() {
    let policy = ClassificationPolicy {
        week_start: Weekday::Mon,
        ..ClassificationPolicy::default()
    };
    let classifier = Classifier::new(policy);
    let sunday = due("a", Frequency::Weekly, at(2025, 6, 29, 12, 0, 0));
    let next_sunday = due("b", Frequency::Weekly, at(2025, 7, 6, 12, 0, 0));
    assert!(!classifier.is_due_this_week(&sunday, now()));
    assert!(classifier.is_due_this_week(&next_sunday, now()));
}

#[test]
fn this_week_follows_local_offset() {
    // 03:00 UTC on Sunday is still Saturday evening at UTC-5.
    let candidate = due("a", Frequency::Weekly, at(2025, 7, 6, 3, 0, 0));
    let utc = Classifier::default();
    let central = Classifier::new(ClassificationPolicy::default().with_utc_offset_minutes(-300));
    assert!(!utc.is_due_this_week(&candidate, now()));
    assert!(central.is_due_this_week(&candidate, now()));
}

#[test]
fn this_week_fallback_counts_only_open_activity() {
    let classifier = Classifier::default();
    let open_visit = by_history("a", "weekly", vec![open(at(2025, 7, 2, 9, 0, 0))]);
    let done_visit = by_history("b", "weekly", vec![completed(at(2025, 7, 2, 9, 0, 0))]);
    let open_last_week = by_history("c", "weekly", vec![open(at(2025, 6, 27, 9, 0, 0))]);
    assert!(classifier.is_due_this_week(&open_visit, now()));
    assert!(!classifier.is_due_this_week(&done_visit, now()));
    assert!(!classifier.is_due_this_week(&open_last_week, now()));
}

#[test]
fn due_date_wins_over_activity_signals() {
    let classifier = Classifier::default();
    let mut work_order = due("a", Frequency::Weekly, at(2025, 7, 20, 9, 0, 0));
    work_order.activity = vec![open(at(2025, 7, 2, 9, 0, 0))];
    assert!(!classifier.is_due_this_week(&work_order, now()));
    assert!(!classifier.is_overdue(&work_order, now()));
    assert!(classifier.is_upcoming(&work_order, now()));
}

#[test]
fn upcoming_end_of_month_horizon() {
    let classifier = Classifier::default();
    assert!(classifier.is_upcoming(&due("a", Frequency::Monthly, at(2025, 7, 31, 23, 59, 59)), now()));
    assert!(!classifier.is_upcoming(&due("b", Frequency::Monthly, at(2025, 8, 1, 0, 0, 0)), now()));
    assert!(!classifier.is_upcoming(&due("c", Frequency::Monthly, now()), now()));
    assert!(!classifier.is_upcoming(&by_history("d", "monthly", vec![]), now()));
}

#[test]
fn upcoming_fixed_day_horizon_is_inclusive() {
    let classifier = Classifier::new(
        ClassificationPolicy::default().with_upcoming_horizon(UpcomingHorizon::Days(30)),
    );
    let edge = due("a", Frequency::Monthly, now() + Duration::days(30));
    let past_edge = due("b", Frequency::Monthly, now() + Duration::days(30) + Duration::seconds(1));
    assert!(classifier.is_upcoming(&edge, now()));
    assert!(!classifier.is_upcoming(&past_edge, now()));
}

#[test]
fn fixed_day_horizon_beyond_calendar_range_is_unbounded() {
    let classifier = Classifier::new(
        ClassificationPolicy::default().with_upcoming_horizon(UpcomingHorizon::Days(u32::MAX)),
    );
    let soon = due("a", Frequency::Weekly, now() + Duration::days(2));
    assert!(classifier.is_upcoming(&soon, now()));
    assert!(!classifier.is_upcoming(&due("b", Frequency::Weekly, now()), now()));
    assert_eq!(classifier.classify(&soon, now()).bucket, StatusBucket::DueThisWeek);
}

#[test]
fn malformed_due_date_answers_false_everywhere() {
    let classifier = Classifier::default();
    let mut work_order = order("bad");
    work_order.schedule.next_due = Some("next tuesday".to_string());

    assert_eq!(classifier.scheduling_mode(&work_order), SchedulingMode::DueDate);
    assert!(!classifier.is_pending(&work_order.schedule));
    assert!(!classifier.is_overdue(&work_order, now()));
    assert!(!classifier.is_due_this_week(&work_order, now()));
    assert!(!classifier.is_upcoming(&work_order, now()));
    assert_eq!(classifier.primary_bucket(&work_order, now()), StatusBucket::Unscheduled);
}

#[test]
fn suggestion_steps_past_now() {
    let classifier = Classifier::default();
    let work_order = by_history("a", "weekly", vec![completed(now() - Duration::days(60))]);
    assert_eq!(
        classifier.suggested_next_date(&work_order, now()),
        Ok(now() + Duration::days(3))
    );
}

#[test]
fn suggestion_without_stepping_when_already_future() {
    let classifier = Classifier::default();
    let work_order = by_history("a", "weekly", vec![completed(now() - Duration::days(1))]);
    assert_eq!(
        classifier.suggested_next_date(&work_order, now()),
        Ok(now() + Duration::days(6))
    );
}

#[test]
fn suggestion_step_limit_is_reported() {
    let classifier = Classifier::default();
    let work_order = by_history("a", "monthly", vec![completed(now() - Duration::days(400))]);
    assert_eq!(
        classifier.suggested_next_date(&work_order, now()),
        Err(SuggestionUnavailable::StepLimitExceeded(10))
    );
}

#[test]
fn monthly_suggestion_uses_calendar_months() {
    let classifier = Classifier::default();
    let work_order = by_history("a", "monthly", vec![completed(at(2025, 1, 31, 10, 0, 0))]);
    assert_eq!(
        classifier.suggested_next_date(&work_order, at(2025, 2, 15, 0, 0, 0)),
        Ok(at(2025, 2, 28, 10, 0, 0))
    );
}

#[test]
fn suggestion_unavailable_reasons() {
    let classifier = Classifier::default();

    let no_activity = by_history("a", "weekly", vec![]);
    assert_eq!(
        classifier.suggested_next_date(&no_activity, now()),
        Err(SuggestionUnavailable::NoActivity)
    );

    let no_frequency = by_history("b", "  ", vec![completed(now() - Duration::days(1))]);
    assert_eq!(
        classifier.suggested_next_date(&no_frequency, now()),
        Err(SuggestionUnavailable::NoFrequency)
    );

    let only_open = by_history("c", "weekly", vec![open(now() - Duration::days(1))]);
    assert_eq!(
        classifier.suggested_next_date(&only_open, now()),
        Err(SuggestionUnavailable::NoCompletedActivity)
    );

    let only_future = by_history("d", "weekly", vec![completed(now() + Duration::days(2))]);
    assert_eq!(
        classifier.suggested_next_date(&only_future, now()),
        Err(SuggestionUnavailable::NoCompletedActivity)
    );

    let unknown = by_history("e", "fortnightly", vec![completed(now() - Duration::days(1))]);
    assert_eq!(
        classifier.suggested_next_date(&unknown, now()),
        Err(SuggestionUnavailable::UnknownFrequency("fortnightly".to_string()))
    );
}

#[test]
fn primary_bucket_precedence() {
    let classifier = Classifier::default();

    let mut fresh_and_late = due("new", Frequency::Weekly, now() - Duration::days(1));
    fresh_and_late.created_date = iso(now() - Duration::days(2));
    assert_eq!(classifier.primary_bucket(&fresh_and_late, now()), StatusBucket::New);

    // Monday of this week: overdue and in-week at once.
    let late_this_week = due("late", Frequency::Weekly, at(2025, 6, 30, 9, 0, 0));
    let classification = classifier.classify(&late_this_week, now());
    assert!(classification.is_overdue && classification.is_due_this_week);
    assert_eq!(classification.bucket, StatusBucket::Overdue);

    let saturday = due("week", Frequency::Weekly, at(2025, 7, 5, 9, 0, 0));
    let classification = classifier.classify(&saturday, now());
    assert!(classification.is_upcoming);
    assert_eq!(classification.bucket, StatusBucket::DueThisWeek);

    let later = due("month", Frequency::Monthly, at(2025, 7, 20, 9, 0, 0));
    assert_eq!(classifier.primary_bucket(&later, now()), StatusBucket::Upcoming);

    let serviced = by_history("pending", "weekly", vec![completed(now() - Duration::days(2))]);
    assert_eq!(classifier.primary_bucket(&serviced, now()), StatusBucket::Pending);

    let far_out = due("far", Frequency::Quarterly, at(2025, 9, 1, 9, 0, 0));
    assert_eq!(classifier.primary_bucket(&far_out, now()), StatusBucket::Unscheduled);
}

#[test]
fn scenario_new_work_order_without_activity() {
    let classifier = Classifier::default();
    let mut work_order = order("a");
    work_order.created_date = iso(now() - Duration::days(2));
    work_order.schedule = Schedule::new(Frequency::Weekly);

    assert!(classifier.is_new(&work_order, now()));
    assert!(classifier.is_pending(&work_order.schedule));

    work_order.schedule.next_due = Some(iso(now() + Duration::days(10)));
    assert!(classifier.is_new(&work_order, now()));
    assert!(!classifier.is_pending(&work_order.schedule));
}

#[test]
fn scenario_forty_days_out_is_not_upcoming_under_either_horizon() {
    let work_order = due("b", Frequency::Monthly, now() + Duration::days(40));
    let month = Classifier::default();
    let thirty_days = Classifier::new(
        ClassificationPolicy::default().with_upcoming_horizon(UpcomingHorizon::Days(30)),
    );
    assert!(!month.is_upcoming(&work_order, now()));
    assert!(!thirty_days.is_upcoming(&work_order, now()));
}

#[test]
fn classify_all_keeps_order_and_buckets_sum_to_total() {
    let classifier = Classifier::default();
    let work_orders = vec![
        due("a", Frequency::Weekly, now() - Duration::days(1)),
        due("b", Frequency::Weekly, at(2025, 7, 5, 9, 0, 0)),
        due("c", Frequency::Monthly, at(2025, 7, 25, 9, 0, 0)),
        by_history("d", "weekly", vec![completed(now() - Duration::days(1))]),
        by_history("e", "weekly", vec![]),
        due("f", Frequency::Annually, at(2026, 1, 1, 0, 0, 0)),
    ];
    let classifications = classifier.classify_all(&work_orders, now());

    let ids: Vec<&str> = classifications
        .iter()
        .map(|c| c.work_order_id.as_str())
        .collect();
    assert_eq!(ids, ["a", "b", "c", "d", "e", "f"]);

    let total: usize = StatusBucket::ALL
        .iter()
        .map(|bucket| classifications.iter().filter(|c| c.bucket == *bucket).count())
        .sum();
    assert_eq!(total, work_orders.len());
}

#[test]
fn classification_is_idempotent() {
    let classifier = Classifier::default();
    let work_order = by_history("a", "weekly", vec![completed(now() - Duration::days(60))]);
    let snapshot = work_order.clone();
    let first = classifier.classify(&work_order, now());
    let second = classifier.classify(&work_order, now());
    assert_eq!(first, second);
    assert_eq!(work_order, snapshot);
}
