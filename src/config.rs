//! Environment-driven configuration for the planner binaries.

use std::{net::SocketAddr, path::PathBuf};

use thiserror::Error;

use crate::schedule::{DEFAULT_DAYS_PER_WEEK, DEFAULT_WEEKLY_CAPACITY_HOURS, SchedulerConfig};

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{var}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

impl ConfigError {
    fn new(var: &'static str, message: impl Into<String>) -> Self {
        Self {
            var,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub http_addr: SocketAddr,

    /// SQLite database file. `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,

    pub scheduler: SchedulerConfig,

    /// Store each computed schedule as assignment records.
    pub persist_assignments: bool,

    /// Insert the default developer roster into an empty store on startup.
    pub seed_developers: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_path: None,
            scheduler: SchedulerConfig::default(),
            persist_assignments: false,
            seed_developers: true,
            log_level: "info".to_string(),
        }
    }
}

fn flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

impl PlannerConfig {
    /// Load configuration from `TASK_PLANNER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let http_addr = lookup("TASK_PLANNER_HTTP_ADDR")
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::new("TASK_PLANNER_HTTP_ADDR", err.to_string()))?;

        let database_path = lookup("TASK_PLANNER_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let weekly_capacity_hours: f64 = lookup("TASK_PLANNER_WEEKLY_HOURS")
            .map(|v| v.parse())
            .transpose()
            .map_err(|_| ConfigError::new("TASK_PLANNER_WEEKLY_HOURS", "must be a number"))?
            .unwrap_or(DEFAULT_WEEKLY_CAPACITY_HOURS);
        if !(weekly_capacity_hours.is_finite() && weekly_capacity_hours > 0.0) {
            return Err(ConfigError::new(
                "TASK_PLANNER_WEEKLY_HOURS",
                "must be greater than zero",
            ));
        }

        let days_per_week: u32 = lookup("TASK_PLANNER_DAYS_PER_WEEK")
            .map(|v| v.parse())
            .transpose()
            .map_err(|_| ConfigError::new("TASK_PLANNER_DAYS_PER_WEEK", "must be an integer"))?
            .unwrap_or(DEFAULT_DAYS_PER_WEEK);
        if days_per_week == 0 {
            return Err(ConfigError::new(
                "TASK_PLANNER_DAYS_PER_WEEK",
                "must be greater than zero",
            ));
        }

        let persist_assignments = flag(lookup("TASK_PLANNER_PERSIST_ASSIGNMENTS"), false);
        let seed_developers = flag(lookup("TASK_PLANNER_SEED_DEVELOPERS"), true);
        let log_level = lookup("TASK_PLANNER_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            http_addr,
            database_path,
            scheduler: SchedulerConfig::new(weekly_capacity_hours, days_per_week),
            persist_assignments,
            seed_developers,
            log_level,
        })
    }
}
