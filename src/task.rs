use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A unit of work pulled from a provider.
///
/// `duration` is the provider's effort estimate in work-hours and only decides
/// the order in which tasks are offered to developers. `difficulty` (1..=10)
/// is what a developer's weekly budget is charged against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub external_id: i64,
    pub name: String,
    pub duration: i64,
    pub difficulty: i64,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        id: i64,
        external_id: i64,
        name: impl Into<String>,
        duration: i64,
        difficulty: i64,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            id,
            external_id,
            name: name.into(),
            duration,
            difficulty,
            provider: provider.into(),
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn from_new(id: i64, new: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            external_id: new.external_id,
            name: new.name,
            duration: new.duration,
            difficulty: new.difficulty,
            provider: new.provider,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

/// Create request for a task. Storage assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub external_id: i64,
    pub name: String,
    pub duration: i64,
    pub difficulty: i64,
    pub provider: String,
}

impl NewTask {
    pub fn new(
        external_id: i64,
        name: impl Into<String>,
        duration: i64,
        difficulty: i64,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            external_id,
            name: name.into(),
            duration,
            difficulty,
            provider: provider.into(),
        }
    }
}

/// Builds a one-row-per-task frame for tabular display.
pub fn tasks_frame(tasks: &[Task]) -> PolarsResult<DataFrame> {
    let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let external_ids: Vec<i64> = tasks.iter().map(|t| t.external_id).collect();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    let durations: Vec<i64> = tasks.iter().map(|t| t.duration).collect();
    let difficulties: Vec<i64> = tasks.iter().map(|t| t.difficulty).collect();
    let providers: Vec<&str> = tasks.iter().map(|t| t.provider.as_str()).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("external_id"), external_ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("duration"), durations).into_column(),
        Series::new(PlSmallStr::from_static("difficulty"), difficulties).into_column(),
        Series::new(PlSmallStr::from_static("provider"), providers).into_column(),
    ])
}
