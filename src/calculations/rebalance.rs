use super::Bucket;
use crate::{Developer, Task};

#[derive(Debug, Clone, Copy)]
pub(crate) struct TaskMove<'a> {
    pub task: &'a Task,
    pub from: &'a Developer,
    pub to: &'a Developer,
}

/// Single best-effort pass that hands one task from each crowded bucket to an
/// idle developer. Runs once per week; no fixed-point iteration.
pub(crate) struct RebalancePass {
    weekly_capacity_hours: f64,
}

impl RebalancePass {
    pub fn new(weekly_capacity_hours: f64) -> Self {
        Self {
            weekly_capacity_hours,
        }
    }

    /// Leaves `buckets` sorted by descending task count (stable).
    pub fn execute<'a>(&self, buckets: &mut [Bucket<'a>]) -> Vec<TaskMove<'a>> {
        buckets.sort_by(|a, b| b.tasks.len().cmp(&a.tasks.len()));

        let mut moves = Vec::new();
        for i in 0..buckets.len() {
            if buckets[i].tasks.len() <= 1 {
                continue;
            }
            let Some(&task) = buckets[i].tasks.last() else {
                continue;
            };

            // Idle destinations start from zero, so only the task's own cost
            // can break the weekly bound.
            let destination = buckets.iter().position(|b| {
                b.tasks.is_empty() && b.developer.effective_cost(task) <= self.weekly_capacity_hours
            });
            let Some(j) = destination else {
                continue;
            };

            let removed = buckets[i].developer.effective_cost(task);
            let added = buckets[j].developer.effective_cost(task);
            buckets[i].tasks.pop();
            buckets[i].workload -= removed;
            buckets[j].workload += added;
            buckets[j].tasks.push(task);

            moves.push(TaskMove {
                task,
                from: buckets[i].developer,
                to: buckets[j].developer,
            });
        }
        moves
    }
}
