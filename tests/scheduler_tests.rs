use std::collections::HashMap;

use task_planner::{
    Developer, ScheduleError, ScheduleObserver, ScheduleResult, SchedulerConfig, Task, schedule,
    schedule_with_observer,
};

fn task(id: i64, difficulty: i64, duration: i64) -> Task {
    Task::new(id, id, format!("Task {id}"), duration, difficulty, "mock-one")
}

fn dev(id: i64, capacity: i64) -> Developer {
    Developer::new(id, format!("DEV{id}"), "Test", capacity)
}

fn roster() -> Vec<Developer> {
    (1..=5).map(|i| dev(i, i)).collect()
}

fn placed_ids(result: &ScheduleResult) -> Vec<i64> {
    let mut ids: Vec<i64> = result
        .assignments
        .iter()
        .flat_map(|w| w.developer_tasks.iter())
        .flat_map(|dt| dt.tasks.iter().map(|t| t.id))
        .collect();
    ids.sort_unstable();
    ids
}

fn assert_within_capacity(result: &ScheduleResult, weekly: f64) {
    for week in &result.assignments {
        for dt in &week.developer_tasks {
            let load: f64 = dt
                .tasks
                .iter()
                .map(|t| dt.developer.effective_cost(t))
                .sum();
            assert!(
                load <= weekly + 1e-9,
                "week {} developer {} over capacity: {}",
                week.week,
                dt.developer.id,
                load
            );
            assert!((load - dt.workload).abs() < 1e-9);
        }
    }
}

#[test]
fn no_tasks_yields_empty_result() {
    let result = schedule(&[], &roster(), &SchedulerConfig::default()).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.total_weeks, 0);
    assert_eq!(result.total_work_days, 0);
    assert_eq!(result.total_effective_cost, 0.0);
}

#[test]
fn single_task_lands_on_single_developer() {
    let result = schedule(&[task(1, 3, 5)], &[dev(1, 1)], &SchedulerConfig::default()).unwrap();
    assert_eq!(result.total_weeks, 1);
    assert_eq!(result.total_work_days, 5);
    assert_eq!(result.total_effective_cost, 3.0);

    let week = &result.assignments[0];
    assert_eq!(week.week, 1);
    assert_eq!(week.developer_tasks.len(), 1);
    assert_eq!(week.developer_tasks[0].developer.id, 1);
    assert_eq!(week.developer_tasks[0].tasks[0].id, 1);
}

#[test]
fn cumulative_budget_spills_into_next_week() {
    let tasks: Vec<Task> = (1..=5).map(|i| task(i, 10, 8)).collect();
    let result = schedule(&tasks, &[dev(1, 1)], &SchedulerConfig::default()).unwrap();

    assert_eq!(result.total_weeks, 2);
    assert_eq!(result.total_work_days, 10);
    assert_eq!(result.total_effective_cost, 50.0);
    assert_eq!(result.summary().total_elapsed_work_hour, 50);

    let week_one: Vec<i64> = result.assignments[0].developer_tasks[0]
        .tasks
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(week_one, vec![1, 2, 3, 4]);
    assert_eq!(result.week_of(5), Some(2));
}

#[test]
fn least_loaded_developer_receives_next_task() {
    let tasks = vec![task(1, 5, 4), task(2, 5, 4)];
    let result = schedule(&tasks, &[dev(1, 1), dev(2, 5)], &SchedulerConfig::default()).unwrap();

    assert_eq!(result.total_weeks, 1);
    let week = &result.assignments[0];
    assert_eq!(week.developer_tasks.len(), 2);
    assert_eq!(week.tasks_for(1).unwrap().tasks[0].id, 1);
    assert_eq!(week.tasks_for(2).unwrap().tasks[0].id, 2);
    assert_eq!(result.total_effective_cost, 6.0);
}

#[test]
fn oversized_task_is_reported_unschedulable() {
    let err = schedule(&[task(1, 100, 5)], &[dev(1, 1)], &SchedulerConfig::default()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Unschedulable {
            week: 1,
            task_ids: vec![1]
        }
    );
}

#[test]
fn unschedulable_after_partial_progress_names_remaining_tasks() {
    let tasks = vec![task(1, 100, 10), task(2, 3, 1)];
    let err = schedule(&tasks, &[dev(1, 1)], &SchedulerConfig::default()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::Unschedulable {
            week: 2,
            task_ids: vec![1]
        }
    );
}

#[test]
fn ineligible_developers_are_skipped() {
    let tasks = vec![task(1, 4, 3), task(2, 4, 2)];
    let developers = vec![dev(1, 0), dev(2, -2), dev(3, 2)];
    let result = schedule(&tasks, &developers, &SchedulerConfig::default()).unwrap();

    for week in &result.assignments {
        for dt in &week.developer_tasks {
            assert_eq!(dt.developer.id, 3);
        }
    }
    assert_eq!(placed_ids(&result), vec![1, 2]);

    let only_idle = schedule(&tasks, &[dev(1, 0)], &SchedulerConfig::default()).unwrap();
    assert!(only_idle.is_empty());
}

#[test]
fn no_developers_yields_empty_result() {
    let result = schedule(&[task(1, 3, 5)], &[], &SchedulerConfig::default()).unwrap();
    assert!(result.is_empty());
}

#[test]
fn longer_tasks_are_placed_first() {
    let tasks = vec![task(1, 20, 1), task(2, 20, 9), task(3, 20, 5)];
    let result = schedule(&tasks, &[dev(1, 1)], &SchedulerConfig::default()).unwrap();

    let order: Vec<Vec<i64>> = result
        .assignments
        .iter()
        .map(|w| w.developer_tasks[0].tasks.iter().map(|t| t.id).collect())
        .collect();
    assert_eq!(order, vec![vec![2, 3], vec![1]]);
}

#[test]
fn work_spreads_evenly_over_equal_developers() {
    let tasks: Vec<Task> = (1..=6).map(|i| task(i, 2, 1)).collect();
    let developers = vec![dev(1, 1), dev(2, 1), dev(3, 1)];
    let result = schedule(&tasks, &developers, &SchedulerConfig::default()).unwrap();

    assert_eq!(result.total_weeks, 1);
    for dt in &result.assignments[0].developer_tasks {
        assert_eq!(dt.tasks.len(), 2);
        assert_eq!(dt.workload, 4.0);
    }
}

#[test]
fn every_task_is_placed_exactly_once_within_capacity() {
    let tasks: Vec<Task> = (1..=40)
        .map(|i| task(i, (i % 10) + 1, (i * 7) % 13 + 1))
        .collect();
    let config = SchedulerConfig::new(6.0, 5);
    let result = schedule(&tasks, &roster(), &config).unwrap();

    assert_eq!(placed_ids(&result), (1..=40).collect::<Vec<_>>());
    assert_within_capacity(&result, config.weekly_capacity_hours);

    let total: f64 = result.assignments.iter().map(|w| w.workload()).sum();
    assert!((total - result.total_effective_cost).abs() < 1e-9);
    assert_eq!(result.total_work_days, u64::from(result.total_weeks) * 5);

    for (idx, week) in result.assignments.iter().enumerate() {
        assert_eq!(week.week as usize, idx + 1);
        assert!(week.task_count() > 0);
    }
}

#[test]
fn scheduling_is_deterministic() {
    let tasks: Vec<Task> = (1..=25).map(|i| task(i, (i % 7) + 1, i % 4)).collect();
    let config = SchedulerConfig::new(5.0, 5);
    let first = schedule(&tasks, &roster(), &config).unwrap();
    let second = schedule(&tasks, &roster(), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn smaller_weekly_budget_needs_more_weeks() {
    let tasks: Vec<Task> = (1..=10).map(|i| task(i, 4, 2)).collect();
    let developers = vec![dev(1, 1)];
    let roomy = schedule(&tasks, &developers, &SchedulerConfig::new(45.0, 5)).unwrap();
    let tight = schedule(&tasks, &developers, &SchedulerConfig::new(4.0, 4)).unwrap();

    assert_eq!(roomy.total_weeks, 1);
    assert_eq!(tight.total_weeks, 10);
    assert_eq!(tight.total_work_days, 40);
}

#[derive(Default)]
struct Recorder {
    skipped: Vec<i64>,
    assigned: HashMap<i64, (u32, i64)>,
    deferred: Vec<(u32, i64)>,
    moved: Vec<(u32, i64, i64, i64)>,
    weeks: Vec<u32>,
}

impl ScheduleObserver for Recorder {
    fn developer_skipped(&mut self, developer: &Developer) {
        self.skipped.push(developer.id);
    }

    fn task_assigned(&mut self, week: u32, task: &Task, developer: &Developer, _cost: f64) {
        self.assigned.insert(task.id, (week, developer.id));
    }

    fn task_deferred(&mut self, week: u32, task: &Task) {
        self.deferred.push((week, task.id));
    }

    fn task_moved(&mut self, week: u32, task: &Task, from: &Developer, to: &Developer) {
        self.moved.push((week, task.id, from.id, to.id));
    }

    fn week_completed(&mut self, assignment: &task_planner::WeeklyAssignment) {
        self.weeks.push(assignment.week);
    }
}

#[test]
fn observer_sees_every_decision() {
    let tasks: Vec<Task> = (1..=5).map(|i| task(i, 10, 8)).collect();
    let developers = vec![dev(1, 1), dev(2, 0)];
    let mut recorder = Recorder::default();

    let result =
        schedule_with_observer(&tasks, &developers, &SchedulerConfig::default(), &mut recorder)
            .unwrap();

    assert_eq!(result.total_weeks, 2);
    assert_eq!(recorder.skipped, vec![2]);
    assert_eq!(recorder.deferred, vec![(1, 5)]);
    assert_eq!(recorder.assigned.get(&5), Some(&(2, 1)));
    assert_eq!(recorder.assigned.len(), 5);
    assert_eq!(recorder.weeks, vec![1, 2]);
    assert!(recorder.moved.is_empty());
}

#[test]
fn free_tasks_are_rebalanced_onto_idle_developer() {
    // Zero-cost tasks never raise a workload, so placement keeps choosing the
    // first developer and leaves the second one idle.
    let tasks: Vec<Task> = (1..=3).map(|i| task(i, 0, 1)).collect();
    let developers = vec![dev(1, 1), dev(2, 1)];
    let mut recorder = Recorder::default();

    let result =
        schedule_with_observer(&tasks, &developers, &SchedulerConfig::default(), &mut recorder)
            .unwrap();

    assert_eq!(result.total_weeks, 1);
    assert_eq!(recorder.moved, vec![(1, 3, 1, 2)]);

    let week = &result.assignments[0];
    let first: Vec<i64> = week.tasks_for(1).unwrap().tasks.iter().map(|t| t.id).collect();
    let second: Vec<i64> = week.tasks_for(2).unwrap().tasks.iter().map(|t| t.id).collect();
    assert_eq!(first, vec![1, 2]);
    assert_eq!(second, vec![3]);
    assert_eq!(placed_ids(&result), vec![1, 2, 3]);
    assert_within_capacity(&result, 45.0);
}

#[test]
fn work_days_do_not_overflow_for_huge_weeks() {
    let tasks = vec![task(1, 10, 2), task(2, 10, 1)];
    let days_per_week = u32::MAX / 2 + 1;
    let result =
        schedule(&tasks, &[dev(1, 1)], &SchedulerConfig::new(10.0, days_per_week)).unwrap();

    assert_eq!(result.total_weeks, 2);
    assert_eq!(result.total_work_days, 2 * u64::from(days_per_week));
    assert_eq!(result.summary().total_work_day, result.total_work_days);
}
