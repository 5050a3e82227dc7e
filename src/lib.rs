pub mod calendar;
pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod report;
pub mod route;
pub mod store;
pub mod telemetry;
pub mod timestamp;
pub mod work_order;

#[cfg(feature = "http_api")]
pub mod http_api;

pub use calendar::ServiceCalendar;
pub use classifier::{
    Classification, ClassificationPolicy, Classifier, SchedulingMode, StatusBucket, Suggestion,
    SuggestionUnavailable, UpcomingHorizon,
};
pub use crate::config::PortalConfig;
pub use dashboard::DashboardSummary;
pub use error::{PortalError, PortalResult};
pub use filter::{SortField, SortOrder, WorkOrderQuery};
pub use report::{dashboard_frame, export_dashboard_csv, render_frame_as_text_table};
pub use route::{AlphabeticalPlanner, RoutePlan, RoutePlanner, plan_route};
pub use store::{
    BundledSource, JsonFileSource, StaticSource, WorkOrderSource, WorkOrderStore,
    load_work_orders_from_json, save_work_orders_to_json,
};
pub use work_order::{
    Activity, ActivityStatus, Contact, ContactPreference, Frequency, Phone, Restrictions,
    Schedule, WorkOrder,
};
