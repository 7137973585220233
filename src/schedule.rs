use crate::calculations::assignment::{AssignmentPass, WeekOutcome};
use crate::calculations::rebalance::RebalancePass;
use crate::calculations::Bucket;
use crate::observer::{NoopObserver, ScheduleObserver};
use crate::{Developer, Task};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_WEEKLY_CAPACITY_HOURS: f64 = 45.0;
pub const DEFAULT_DAYS_PER_WEEK: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Budget each developer may spend per week, in effective-cost hours.
    pub weekly_capacity_hours: f64,
    /// Only used to convert the week count into work days.
    pub days_per_week: u32,
}

impl SchedulerConfig {
    pub fn new(weekly_capacity_hours: f64, days_per_week: u32) -> Self {
        Self {
            weekly_capacity_hours,
            days_per_week,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WEEKLY_CAPACITY_HOURS, DEFAULT_DAYS_PER_WEEK)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("tasks {task_ids:?} cannot fit any developer's weekly capacity (no progress in week {week})")]
    Unschedulable { week: u32, task_ids: Vec<i64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperTasks {
    pub developer: Developer,
    pub tasks: Vec<Task>,
    /// Sum of the effective cost of `tasks` for this developer.
    pub workload: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAssignment {
    pub week: u32,
    pub developer_tasks: Vec<DeveloperTasks>,
}

impl WeeklyAssignment {
    fn from_buckets(week: u32, buckets: Vec<Bucket<'_>>) -> Self {
        let developer_tasks = buckets
            .into_iter()
            .filter(|bucket| !bucket.tasks.is_empty())
            .map(|bucket| DeveloperTasks {
                developer: bucket.developer.clone(),
                tasks: bucket.tasks.into_iter().cloned().collect(),
                workload: bucket.workload,
            })
            .collect();
        Self {
            week,
            developer_tasks,
        }
    }

    pub fn task_count(&self) -> usize {
        self.developer_tasks.iter().map(|dt| dt.tasks.len()).sum()
    }

    pub fn workload(&self) -> f64 {
        self.developer_tasks.iter().map(|dt| dt.workload).sum()
    }

    pub fn tasks_for(&self, developer_id: i64) -> Option<&DeveloperTasks> {
        self.developer_tasks
            .iter()
            .find(|dt| dt.developer.id == developer_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub assignments: Vec<WeeklyAssignment>,
    pub total_weeks: u32,
    /// `total_weeks * days_per_week`, widened so the product cannot overflow.
    pub total_work_days: u64,
    /// Unrounded sum of every accepted effective cost.
    pub total_effective_cost: f64,
}

/// Integer counters reported at the HTTP/CLI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub min_week: u32,
    pub total_work_day: u64,
    pub total_elapsed_work_hour: u64,
    pub task_count: usize,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "weeks={}, work_days={}, hours={}, tasks={}",
            self.min_week, self.total_work_day, self.total_elapsed_work_hour, self.task_count
        )
    }
}

impl ScheduleResult {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.assignments.iter().map(WeeklyAssignment::task_count).sum()
    }

    /// Total effective cost truncated to whole hours.
    pub fn total_elapsed_work_hours(&self) -> u64 {
        self.total_effective_cost.max(0.0).trunc() as u64
    }

    /// Week in which `task_id` was placed, if it was.
    pub fn week_of(&self, task_id: i64) -> Option<u32> {
        self.assignments.iter().find_map(|week| {
            week.developer_tasks
                .iter()
                .any(|dt| dt.tasks.iter().any(|t| t.id == task_id))
                .then_some(week.week)
        })
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            min_week: self.total_weeks,
            total_work_day: self.total_work_days,
            total_elapsed_work_hour: self.total_elapsed_work_hours(),
            task_count: self.task_count(),
        }
    }

    /// One row per placed task.
    pub fn assignments_frame(&self) -> PolarsResult<DataFrame> {
        let mut weeks: Vec<i64> = Vec::new();
        let mut developer_ids: Vec<i64> = Vec::new();
        let mut developers: Vec<String> = Vec::new();
        let mut task_ids: Vec<i64> = Vec::new();
        let mut external_ids: Vec<i64> = Vec::new();
        let mut task_names: Vec<&str> = Vec::new();
        let mut difficulties: Vec<i64> = Vec::new();
        let mut durations: Vec<i64> = Vec::new();
        let mut costs: Vec<f64> = Vec::new();

        for week in &self.assignments {
            for dt in &week.developer_tasks {
                for task in &dt.tasks {
                    weeks.push(i64::from(week.week));
                    developer_ids.push(dt.developer.id);
                    developers.push(dt.developer.full_name());
                    task_ids.push(task.id);
                    external_ids.push(task.external_id);
                    task_names.push(task.name.as_str());
                    difficulties.push(task.difficulty);
                    durations.push(task.duration);
                    costs.push(dt.developer.effective_cost(task));
                }
            }
        }

        let developer_names: Vec<&str> = developers.iter().map(String::as_str).collect();
        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("week"), weeks).into_column(),
            Series::new(PlSmallStr::from_static("developer_id"), developer_ids).into_column(),
            Series::new(PlSmallStr::from_static("developer"), developer_names).into_column(),
            Series::new(PlSmallStr::from_static("task_id"), task_ids).into_column(),
            Series::new(PlSmallStr::from_static("external_id"), external_ids).into_column(),
            Series::new(PlSmallStr::from_static("task"), task_names).into_column(),
            Series::new(PlSmallStr::from_static("difficulty"), difficulties).into_column(),
            Series::new(PlSmallStr::from_static("duration"), durations).into_column(),
            Series::new(PlSmallStr::from_static("effective_cost"), costs).into_column(),
        ])
    }

    /// Per-developer totals across the whole run, ordered by developer id.
    pub fn developer_load_frame(&self) -> PolarsResult<DataFrame> {
        self.assignments_frame()?
            .lazy()
            .group_by_stable([col("developer_id"), col("developer")])
            .agg([
                col("task_id").count().alias("task_count"),
                col("effective_cost").sum().alias("total_cost"),
                col("week").n_unique().alias("weeks_active"),
            ])
            .sort(["developer_id"], SortMultipleOptions::default())
            .collect()
    }
}

/// Spreads `tasks` over as many weeks as needed.
///
/// Tasks are offered longest-duration first; each goes to the least-loaded
/// developer whose remaining weekly budget can absorb `difficulty / capacity`.
/// Developers with a non-positive capacity are ignored. An empty task list or
/// an empty (or fully ineligible) developer list yields an empty result. A
/// week that places nothing while tasks remain fails with
/// [`ScheduleError::Unschedulable`].
pub fn schedule(
    tasks: &[Task],
    developers: &[Developer],
    config: &SchedulerConfig,
) -> Result<ScheduleResult, ScheduleError> {
    schedule_with_observer(tasks, developers, config, &mut NoopObserver)
}

pub fn schedule_with_observer(
    tasks: &[Task],
    developers: &[Developer],
    config: &SchedulerConfig,
    observer: &mut dyn ScheduleObserver,
) -> Result<ScheduleResult, ScheduleError> {
    let mut eligible = Vec::with_capacity(developers.len());
    for developer in developers {
        if developer.is_eligible() {
            eligible.push(developer);
        } else {
            observer.developer_skipped(developer);
        }
    }

    if tasks.is_empty() || eligible.is_empty() {
        return Ok(ScheduleResult::default());
    }

    let mut pending: Vec<&Task> = tasks.iter().collect();
    pending.sort_by(|a, b| b.duration.cmp(&a.duration));

    let mut pass = AssignmentPass::new(eligible, config.weekly_capacity_hours);
    let rebalance = RebalancePass::new(config.weekly_capacity_hours);

    let mut assignments = Vec::new();
    let mut total_effective_cost = 0.0;
    let mut week: u32 = 1;

    while !pending.is_empty() {
        let WeekOutcome {
            mut buckets,
            deferred,
            placed,
        } = pass.execute(week, &pending, observer);

        if placed == 0 {
            return Err(ScheduleError::Unschedulable {
                week,
                task_ids: pending.iter().map(|t| t.id).collect(),
            });
        }

        for moved in rebalance.execute(&mut buckets) {
            observer.task_moved(week, moved.task, moved.from, moved.to);
        }

        let weekly = WeeklyAssignment::from_buckets(week, buckets);
        total_effective_cost += weekly.workload();
        observer.week_completed(&weekly);
        assignments.push(weekly);

        pending = deferred;
        week += 1;
    }

    let total_weeks = assignments.len() as u32;
    Ok(ScheduleResult {
        assignments,
        total_weeks,
        total_work_days: u64::from(total_weeks) * u64::from(config.days_per_week),
        total_effective_cost,
    })
}
