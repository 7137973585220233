//! Hooks for watching a scheduling run without the scheduler doing any I/O.

use tracing::{debug, trace, warn};

use crate::schedule::WeeklyAssignment;
use crate::{Developer, Task};

/// Receives events while [`crate::schedule_with_observer`] runs. Every method
/// has an empty default so implementors only override what they need.
pub trait ScheduleObserver {
    fn developer_skipped(&mut self, _developer: &Developer) {}

    fn task_assigned(&mut self, _week: u32, _task: &Task, _developer: &Developer, _cost: f64) {}

    fn task_deferred(&mut self, _week: u32, _task: &Task) {}

    fn task_moved(&mut self, _week: u32, _task: &Task, _from: &Developer, _to: &Developer) {}

    fn week_completed(&mut self, _assignment: &WeeklyAssignment) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScheduleObserver for NoopObserver {}

/// Forwards scheduler events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScheduleObserver for TracingObserver {
    fn developer_skipped(&mut self, developer: &Developer) {
        warn!(
            developer_id = developer.id,
            capacity = developer.capacity,
            "developer has non-positive capacity; skipped"
        );
    }

    fn task_assigned(&mut self, week: u32, task: &Task, developer: &Developer, cost: f64) {
        trace!(week, task_id = task.id, developer_id = developer.id, cost, "task assigned");
    }

    fn task_deferred(&mut self, week: u32, task: &Task) {
        trace!(week, task_id = task.id, "task carried over to next week");
    }

    fn task_moved(&mut self, week: u32, task: &Task, from: &Developer, to: &Developer) {
        debug!(
            week,
            task_id = task.id,
            from_developer = from.id,
            to_developer = to.id,
            "task rebalanced to idle developer"
        );
    }

    fn week_completed(&mut self, assignment: &WeeklyAssignment) {
        debug!(
            week = assignment.week,
            tasks = assignment.task_count(),
            developers = assignment.developer_tasks.len(),
            "week completed"
        );
    }
}
