use super::{AssignmentRecord, Page, PersistenceError, PersistenceResult, PlannerStore};
use crate::{Developer, NewDeveloper, NewTask, ScheduleResult, Task};
use chrono::Utc;
use parking_lot::RwLock;

#[derive(Default)]
struct MemoryState {
    tasks: Vec<Task>,
    developers: Vec<Developer>,
    assignments: Vec<AssignmentRecord>,
    next_task_id: i64,
    next_developer_id: i64,
    next_assignment_id: i64,
}

/// Process-local store, used when no database path is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlannerStore for MemoryStore {
    fn create_task(&self, task: NewTask) -> PersistenceResult<Task> {
        let mut state = self.state.write();
        let exists = state
            .tasks
            .iter()
            .any(|t| t.external_id == task.external_id && t.provider == task.provider);
        if exists {
            return Err(PersistenceError::Duplicate {
                external_id: task.external_id,
                provider: task.provider,
            });
        }
        state.next_task_id += 1;
        let created = Task::from_new(state.next_task_id, task, Utc::now());
        state.tasks.push(created.clone());
        Ok(created)
    }

    fn get_task(&self, id: i64) -> PersistenceResult<Option<Task>> {
        let state = self.state.read();
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    fn list_tasks(&self, page: Page) -> PersistenceResult<Vec<Task>> {
        let state = self.state.read();
        Ok(page.apply(state.tasks.iter().cloned()))
    }

    fn create_developer(&self, developer: NewDeveloper) -> PersistenceResult<Developer> {
        let mut state = self.state.write();
        state.next_developer_id += 1;
        let created = Developer::from_new(state.next_developer_id, developer, Utc::now());
        state.developers.push(created.clone());
        Ok(created)
    }

    fn list_developers(&self) -> PersistenceResult<Vec<Developer>> {
        Ok(self.state.read().developers.clone())
    }

    fn save_assignments(&self, result: &ScheduleResult) -> PersistenceResult<()> {
        let now = Utc::now();
        let mut state = self.state.write();
        state.assignments.clear();
        for (week, task_id, developer_id, effective_cost) in super::assignment_rows(result) {
            state.next_assignment_id += 1;
            let id = state.next_assignment_id;
            state.assignments.push(AssignmentRecord {
                id,
                week,
                task_id,
                developer_id,
                effective_cost,
                created_at: now,
            });
        }
        Ok(())
    }

    fn list_assignments(&self) -> PersistenceResult<Vec<AssignmentRecord>> {
        Ok(self.state.read().assignments.clone())
    }
}
