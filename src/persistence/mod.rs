use crate::{Developer, NewDeveloper, NewTask, ScheduleResult, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("task with externalId={external_id} and provider={provider} already exists")]
    Duplicate { external_id: i64, provider: String },
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Offset/limit window over an id-ordered listing. A `limit` of zero means
/// "no limit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

impl Page {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub(crate) fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        let items = items.skip(self.offset);
        if self.limit == 0 {
            items.collect()
        } else {
            items.take(self.limit).collect()
        }
    }
}

/// One placed task from a stored schedule run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: i64,
    pub week: u32,
    pub task_id: i64,
    pub developer_id: i64,
    pub effective_cost: f64,
    pub created_at: DateTime<Utc>,
}

/// Flattens a schedule into `(week, task_id, developer_id, effective_cost)`
/// rows in output order.
pub(crate) fn assignment_rows(result: &ScheduleResult) -> Vec<(u32, i64, i64, f64)> {
    let mut rows = Vec::with_capacity(result.task_count());
    for week in &result.assignments {
        for dt in &week.developer_tasks {
            for task in &dt.tasks {
                rows.push((
                    week.week,
                    task.id,
                    dt.developer.id,
                    dt.developer.effective_cost(task),
                ));
            }
        }
    }
    rows
}

/// Storage collaborator for tasks, developers and stored assignments.
pub trait PlannerStore: Send + Sync {
    fn create_task(&self, task: NewTask) -> PersistenceResult<Task>;
    fn get_task(&self, id: i64) -> PersistenceResult<Option<Task>>;
    fn list_tasks(&self, page: Page) -> PersistenceResult<Vec<Task>>;

    fn create_developer(&self, developer: NewDeveloper) -> PersistenceResult<Developer>;
    fn list_developers(&self) -> PersistenceResult<Vec<Developer>>;

    /// Replaces any previously stored assignments with `result`.
    fn save_assignments(&self, result: &ScheduleResult) -> PersistenceResult<()>;
    fn list_assignments(&self) -> PersistenceResult<Vec<AssignmentRecord>>;
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_developers_from_csv, load_developers_from_json, load_tasks_from_csv,
    load_tasks_from_json, save_schedule_to_csv, save_schedule_to_json,
};
pub use memory::MemoryStore;
