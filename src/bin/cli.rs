use chrono::{DateTime, NaiveDate, Utc};
use std::io::{self, Write};
use tracing::warn;
use work_order_portal::{
    ActivityStatus, AlphabeticalPlanner, Classifier, DashboardSummary, Frequency, JsonFileSource,
    PortalConfig, SortField, SortOrder, StatusBucket, WorkOrder, WorkOrderQuery, WorkOrderStore,
    dashboard_frame, export_dashboard_csv, plan_route, render_frame_as_text_table, telemetry,
    timestamp,
};

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show work orders matching the current filters\n  stats                              Show dashboard counts\n  load <path>                        Load work orders from a JSON file\n  refresh                            Reload from the current source\n  filter <bucket|clear>              Filter by status (new, overdue, this_week, upcoming, pending, unscheduled)\n  search <text...|clear>             Search name, description and address\n  cadence <frequency|clear>          Filter by frequency (daily, weekly, bi-weekly, ...)\n  activity <from> <to> [status]      Keep work orders with activity in a date range (YYYY-MM-DD)\n  activity clear                     Clear the activity filter\n  sort <due|name|created> [asc|desc] Sort the list\n  sort clear                         Keep source order\n  detail <id>                        Show one work order\n  suggest <id>                       Show the suggested next service date\n  route <origin...>                  Plan a visit order for the visible work orders\n  now [<date>|clear]                 Show or pin the evaluation instant\n  export <path>                      Write the visible list to CSV\n  quit|exit                          Exit"
    );
}

fn visible(
    query: &WorkOrderQuery,
    classifier: &Classifier,
    store: &WorkOrderStore,
    now: DateTime<Utc>,
) -> Vec<WorkOrder> {
    query
        .apply(classifier, store.work_orders(), now)
        .into_iter()
        .cloned()
        .collect()
}

fn print_table(work_orders: &[WorkOrder], classifier: &Classifier, now: DateTime<Utc>) {
    if work_orders.is_empty() {
        println!("No work orders match the current filters.");
        return;
    }
    match dashboard_frame(classifier, work_orders, now) {
        Ok(df) => println!("{}", render_frame_as_text_table(&df)),
        Err(e) => println!("Error building table: {}", e),
    }
}

fn print_detail(work_order: &WorkOrder, classifier: &Classifier, now: DateTime<Utc>) {
    let offset = classifier.calendar().offset();
    let classification = classifier.classify(work_order, now);
    let next_due = work_order.schedule.next_due.as_deref();
    let frequency = work_order
        .schedule
        .frequency()
        .map(|f| f.label().to_string())
        .unwrap_or_else(|| work_order.schedule.frequency_raw.clone());
    let flags = StatusBucket::ALL
        .iter()
        .filter(|bucket| **bucket != StatusBucket::Unscheduled && classification.has_flag(**bucket))
        .map(|bucket| bucket.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    println!("Work order   : {} ({})", work_order.name, work_order.id);
    println!("Address      : {}", work_order.address);
    println!("Description  : {}", work_order.description);
    println!("Frequency    : {}", frequency);
    println!(
        "Next due     : {} ({})",
        timestamp::format_date(next_due, offset),
        timestamp::format_relative(next_due, now, offset)
    );
    println!("Status       : {}", classification.bucket.label());
    println!("Flags        : {}", if flags.is_empty() { "-" } else { flags.as_str() });
    match work_order.most_recent_activity(offset) {
        Some(activity) => println!(
            "Last activity: {} {} by {} ({})",
            timestamp::format_date(Some(&activity.date), offset),
            activity.kind,
            activity.technician,
            activity.status
        ),
        None => println!("Last activity: none"),
    }
    match work_order.primary_contact() {
        Some(contact) => println!(
            "Contact      : {} <{}> {}",
            contact.name,
            contact.email,
            contact.phone_summary()
        ),
        None => println!("Contact      : none"),
    }
    print_suggestion(work_order, classifier, now);
}

fn print_suggestion(work_order: &WorkOrder, classifier: &Classifier, now: DateTime<Utc>) {
    let offset = classifier.calendar().offset();
    match classifier.suggested_next_date(work_order, now) {
        Ok(date) => println!("Suggested    : {}", timestamp::format_instant(date, offset)),
        Err(reason) => println!("Suggested    : unavailable ({})", reason),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn main() {
    let config = PortalConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Ignoring invalid configuration: {}", e);
        PortalConfig::default()
    });
    telemetry::init_tracing(&config.log_level);

    let classifier = Classifier::new(config.policy());
    let mut store = match config.data_path.as_deref() {
        Some(path) => WorkOrderStore::new(JsonFileSource::new(path)),
        None => WorkOrderStore::bundled(),
    };
    if let Err(e) = store.refresh() {
        warn!(error = %e, "no work orders loaded");
    }

    let mut query = WorkOrderQuery::default();
    let mut pinned_now: Option<DateTime<Utc>> = None;

    println!("Work Order Portal (CLI) - type 'help' for commands\n");
    println!(
        "Loaded {} work orders from {}",
        store.len(),
        store.source_description()
    );
    if let Some(err) = store.last_error() {
        println!("Warning: {}", err);
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();
        let now = pinned_now.unwrap_or_else(Utc::now);

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => {
                let work_orders = visible(&query, &classifier, &store, now);
                print_table(&work_orders, &classifier, now);
            }
            "stats" => {
                let summary = DashboardSummary::build(&classifier, store.work_orders(), now);
                println!("{}", summary.to_cli_summary());
                for bucket in StatusBucket::ALL {
                    println!(
                        "  {:<12} {:>4} (flagged {})",
                        bucket.label(),
                        summary.primary_count(bucket),
                        summary.flagged_count(bucket)
                    );
                }
            }
            "load" => match rest.first() {
                Some(path) => match store.load(JsonFileSource::new(*path)) {
                    Ok(count) => println!("Loaded {} work orders from {}", count, path),
                    Err(e) => println!(
                        "Load error: {}. Keeping {} work orders from {}",
                        e,
                        store.len(),
                        store.source_description()
                    ),
                },
                None => println!("Usage: load <path>"),
            },
            "refresh" => match store.refresh() {
                Ok(count) => println!(
                    "Refreshed {} work orders from {}",
                    count,
                    store.source_description()
                ),
                Err(e) => println!("Refresh error: {}", e),
            },
            "filter" => match rest.first().copied() {
                Some("clear") => {
                    query.bucket = None;
                    println!("Status filter cleared.");
                }
                Some(raw) => match StatusBucket::from_str(raw) {
                    Some(bucket) => {
                        query.bucket = Some(bucket);
                        println!("Status filter: {}", bucket.label());
                    }
                    None => println!("Unknown status '{}'", raw),
                },
                None => println!("Usage: filter <bucket|clear>"),
            },
            "search" => {
                if rest.is_empty() || rest == ["clear"] {
                    query.search_text = None;
                    println!("Search cleared.");
                } else {
                    let text = rest.join(" ");
                    println!("Searching for '{}'", text);
                    query.search_text = Some(text);
                }
            }
            "cadence" => match rest.first().copied() {
                Some("clear") => {
                    query.cadence = None;
                    println!("Cadence filter cleared.");
                }
                Some(raw) => match Frequency::from_str(raw) {
                    Some(frequency) => {
                        query.cadence = Some(frequency);
                        println!("Cadence filter: {}", frequency.label());
                    }
                    None => println!("Unknown frequency '{}'", raw),
                },
                None => println!("Usage: cadence <frequency|clear>"),
            },
            "activity" => match rest.as_slice() {
                ["clear"] => {
                    query.activity_date_from = None;
                    query.activity_date_to = None;
                    query.activity_status = None;
                    println!("Activity filter cleared.");
                }
                [from, to, status @ ..] => {
                    let (Some(from), Some(to)) = (parse_date(from), parse_date(to)) else {
                        println!("Invalid date (YYYY-MM-DD)");
                        continue;
                    };
                    query.activity_date_from = Some(from);
                    query.activity_date_to = Some(to);
                    query.activity_status = status.first().map(|s| ActivityStatus::parse_lenient(s));
                    println!("Activity filter: {} to {}", from, to);
                }
                _ => println!("Usage: activity <from> <to> [status] | activity clear"),
            },
            "sort" => match rest.first().copied() {
                Some("clear") => {
                    query.sort = None;
                    println!("Sort cleared.");
                }
                Some(raw) => match SortField::from_str(raw) {
                    Some(field) => {
                        let order = match rest.get(1).copied() {
                            Some("desc") => SortOrder::Desc,
                            Some("asc") => SortOrder::Asc,
                            // Repeating the same field flips the direction.
                            _ => match query.sort {
                                Some((current, order)) if current == field => order.toggled(),
                                _ => SortOrder::Asc,
                            },
                        };
                        query.sort = Some((field, order));
                        println!("Sorted by {} ({:?})", raw, order);
                    }
                    None => println!("Unknown sort field '{}'", raw),
                },
                None => println!("Usage: sort <due|name|created> [asc|desc]"),
            },
            "detail" | "suggest" => match rest.first() {
                Some(id) => match store.find(id) {
                    Some(work_order) if cmd == "detail" => {
                        print_detail(work_order, &classifier, now)
                    }
                    Some(work_order) => print_suggestion(work_order, &classifier, now),
                    None => println!("Work order {} not found.", id),
                },
                None => println!("Usage: {} <id>", cmd),
            },
            "route" => {
                let origin = rest.join(" ");
                let work_orders = query.apply(&classifier, store.work_orders(), now);
                match plan_route(&AlphabeticalPlanner, &origin, &work_orders) {
                    Ok(plan) => {
                        println!("Route from {} ({})", plan.origin, plan.to_cli_summary());
                        for stop in &plan.stops {
                            println!(
                                "  {:>2}. {} - {}",
                                stop.sequence,
                                stop.name,
                                stop.address.as_deref().unwrap_or("(no address)")
                            );
                        }
                    }
                    Err(e) => println!("Route error: {}", e),
                }
            }
            "now" => match rest.first().copied() {
                None => println!("Evaluating at {}", now.to_rfc3339()),
                Some("clear") => {
                    pinned_now = None;
                    println!("Using the system clock.");
                }
                Some(raw) => {
                    match timestamp::parse_timestamp(raw, classifier.calendar().offset()) {
                        Some(instant) => {
                            pinned_now = Some(instant);
                            println!("Evaluating at {}", instant.to_rfc3339());
                        }
                        None => println!("Invalid instant '{}'", raw),
                    }
                }
            },
            "export" => match rest.first() {
                Some(path) => {
                    let work_orders = visible(&query, &classifier, &store, now);
                    match export_dashboard_csv(&classifier, &work_orders, now, path) {
                        Ok(count) => println!("Exported {} rows to {}", count, path),
                        Err(e) => println!("Export error: {}", e),
                    }
                }
                None => println!("Usage: export <path>"),
            },
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
