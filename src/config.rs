use crate::classifier::{ClassificationPolicy, UpcomingHorizon};
use chrono::Weekday;
use ::config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Runtime settings, read from `PORTAL_*` environment variables.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PortalConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// JSON file with work orders; the bundled sample data is used when unset
    #[serde(default)]
    pub data_path: Option<String>,

    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Local business time, minutes east of UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// First day of the service week (sun, mon, ...)
    #[serde(default = "default_week_start")]
    pub week_start: String,

    /// `end_of_month` or `days`
    #[serde(default = "default_upcoming_horizon")]
    pub upcoming_horizon: String,

    /// Window length used when `upcoming_horizon` is `days`
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_week_start() -> String {
    "sun".to_string()
}

fn default_upcoming_horizon() -> String {
    "end_of_month".to_string()
}

fn default_upcoming_days() -> u32 {
    30
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_path: None,
            http_addr: default_http_addr(),
            utc_offset_minutes: 0,
            week_start: default_week_start(),
            upcoming_horizon: default_upcoming_horizon(),
            upcoming_days: default_upcoming_days(),
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("PORTAL"))
            .build()?
            .try_deserialize()
    }

    /// Classification settings. Unrecognised values fall back to the defaults with a warning.
    pub fn policy(&self) -> ClassificationPolicy {
        let mut policy = ClassificationPolicy::default();
        policy.utc_offset_minutes = self.utc_offset_minutes;

        match self.week_start.trim().parse::<Weekday>() {
            Ok(weekday) => policy.week_start = weekday,
            Err(_) => warn!(week_start = %self.week_start, "unknown week start, using Sunday"),
        }

        policy.upcoming_horizon = match self.upcoming_horizon.trim().to_ascii_lowercase().as_str() {
            "end_of_month" | "month" => UpcomingHorizon::EndOfMonth,
            "days" => UpcomingHorizon::Days(self.upcoming_days),
            other => {
                warn!(upcoming_horizon = other, "unknown upcoming horizon, using end_of_month");
                UpcomingHorizon::EndOfMonth
            }
        };
        policy
    }
}
