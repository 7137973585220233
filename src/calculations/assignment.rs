use super::Bucket;
use crate::observer::ScheduleObserver;
use crate::{Developer, Task};

pub(crate) struct WeekOutcome<'a> {
    /// One bucket per eligible developer: assigned developers in order of
    /// their first task, then idle developers.
    pub buckets: Vec<Bucket<'a>>,
    /// Tasks nobody could absorb, in their input order.
    pub deferred: Vec<&'a Task>,
    pub placed: usize,
}

/// Greedy least-loaded-first placement for a single week.
///
/// The developer order survives between weeks: every re-sort is stable, so a
/// tie on workload keeps whatever order the previous sort produced.
pub(crate) struct AssignmentPass<'a> {
    developers: Vec<&'a Developer>,
    order: Vec<usize>,
    weekly_capacity_hours: f64,
}

impl<'a> AssignmentPass<'a> {
    /// `developers` must already be filtered down to eligible ones.
    pub fn new(developers: Vec<&'a Developer>, weekly_capacity_hours: f64) -> Self {
        let order = (0..developers.len()).collect();
        Self {
            developers,
            order,
            weekly_capacity_hours,
        }
    }

    pub fn execute(
        &mut self,
        week: u32,
        pending: &[&'a Task],
        observer: &mut dyn ScheduleObserver,
    ) -> WeekOutcome<'a> {
        let mut workloads = vec![0.0_f64; self.developers.len()];
        let mut bucket_of: Vec<Option<usize>> = vec![None; self.developers.len()];
        let mut buckets: Vec<Bucket<'a>> = Vec::new();
        let mut deferred = Vec::new();
        let mut placed = 0;

        for &task in pending {
            self.order
                .sort_by(|a, b| workloads[*a].total_cmp(&workloads[*b]));

            let target = self.order.iter().copied().find_map(|slot| {
                let cost = self.developers[slot].effective_cost(task);
                (workloads[slot] + cost <= self.weekly_capacity_hours).then_some((slot, cost))
            });

            let Some((slot, cost)) = target else {
                observer.task_deferred(week, task);
                deferred.push(task);
                continue;
            };

            let developer = self.developers[slot];
            let idx = match bucket_of[slot] {
                Some(idx) => idx,
                None => {
                    buckets.push(Bucket::new(developer));
                    bucket_of[slot] = Some(buckets.len() - 1);
                    buckets.len() - 1
                }
            };
            buckets[idx].tasks.push(task);
            buckets[idx].workload += cost;
            workloads[slot] += cost;
            placed += 1;
            observer.task_assigned(week, task, developer, cost);
        }

        for &slot in &self.order {
            if bucket_of[slot].is_none() {
                buckets.push(Bucket::new(self.developers[slot]));
            }
        }

        WeekOutcome {
            buckets,
            deferred,
            placed,
        }
    }
}
