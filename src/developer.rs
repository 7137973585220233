use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Developer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Productivity divisor. Only developers with a positive capacity receive work.
    pub capacity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Developer {
    pub fn new(
        id: i64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        capacity: i64,
    ) -> Self {
        let first_name = first_name.into();
        let email = format!("{}@example.com", first_name.to_lowercase());
        Self {
            id,
            first_name,
            last_name: last_name.into(),
            email,
            capacity,
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn from_new(id: i64, new: NewDeveloper, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            capacity: new.capacity,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_eligible(&self) -> bool {
        self.capacity > 0
    }

    /// Hours of this developer's weekly budget that `task` consumes.
    ///
    /// Callers must check [`Developer::is_eligible`] first; the result is not
    /// finite for a zero capacity.
    pub fn effective_cost(&self, task: &Task) -> f64 {
        task.difficulty as f64 / self.capacity as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeveloper {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub capacity: i64,
}

impl NewDeveloper {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        capacity: i64,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            capacity,
        }
    }
}

/// The five developers a fresh deployment is seeded with.
pub fn default_roster() -> Vec<NewDeveloper> {
    [(1, "One"), (2, "Two"), (3, "Three"), (4, "Four"), (5, "Five")]
        .into_iter()
        .map(|(n, last)| {
            NewDeveloper::new(
                format!("DEV{n}"),
                last,
                format!("dev{n}@example.com"),
                n,
            )
        })
        .collect()
}

pub fn developers_frame(developers: &[Developer]) -> PolarsResult<DataFrame> {
    let ids: Vec<i64> = developers.iter().map(|d| d.id).collect();
    let names: Vec<String> = developers.iter().map(Developer::full_name).collect();
    let emails: Vec<&str> = developers.iter().map(|d| d.email.as_str()).collect();
    let capacities: Vec<i64> = developers.iter().map(|d| d.capacity).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("developer"), names).into_column(),
        Series::new(PlSmallStr::from_static("email"), emails).into_column(),
        Series::new(PlSmallStr::from_static("capacity"), capacities).into_column(),
    ])
}
