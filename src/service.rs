use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::persistence::{AssignmentRecord, Page, PersistenceError, PlannerStore};
use crate::provider::{ProviderError, normalize_records};
use crate::task_validation::{validate_new_developer, validate_new_task};
use crate::{
    Developer, NewDeveloper, NewTask, ScheduleError, ScheduleResult, SchedulerConfig, Task,
    TaskValidationError, TracingObserver, default_roster, schedule_with_observer,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of a provider import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Application layer over a [`PlannerStore`]: validates requests, runs the
/// scheduler over the stored collections and optionally records the result.
pub struct PlannerService {
    store: Arc<dyn PlannerStore>,
    config: SchedulerConfig,
    persist_assignments: bool,
}

impl PlannerService {
    pub fn new(store: Arc<dyn PlannerStore>, config: SchedulerConfig) -> Self {
        Self {
            store,
            config,
            persist_assignments: false,
        }
    }

    pub fn with_persisted_assignments(mut self, persist: bool) -> Self {
        self.persist_assignments = persist;
        self
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    pub fn create_task(&self, task: NewTask) -> ServiceResult<Task> {
        validate_new_task(&task)?;
        let created = self.store.create_task(task)?;
        info!(
            task_id = created.id,
            external_id = created.external_id,
            provider = %created.provider,
            "task created"
        );
        Ok(created)
    }

    pub fn list_tasks(&self, page: Page) -> ServiceResult<Vec<Task>> {
        let tasks = self.store.list_tasks(page)?;
        debug!(offset = page.offset, limit = page.limit, count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    pub fn get_task(&self, id: i64) -> ServiceResult<Option<Task>> {
        Ok(self.store.get_task(id)?)
    }

    pub fn create_developer(&self, developer: NewDeveloper) -> ServiceResult<Developer> {
        validate_new_developer(&developer)?;
        if developer.capacity <= 0 {
            warn!(
                email = %developer.email,
                capacity = developer.capacity,
                "developer has no capacity and will never be scheduled"
            );
        }
        let created = self.store.create_developer(developer)?;
        info!(developer_id = created.id, capacity = created.capacity, "developer created");
        Ok(created)
    }

    pub fn list_developers(&self) -> ServiceResult<Vec<Developer>> {
        Ok(self.store.list_developers()?)
    }

    /// Inserts the default roster when the store holds no developers yet.
    /// Returns the number of developers created.
    pub fn seed_developers(&self) -> ServiceResult<usize> {
        if !self.store.list_developers()?.is_empty() {
            debug!("developer roster already present, skipping seed");
            return Ok(0);
        }
        let roster = default_roster();
        let count = roster.len();
        for developer in roster {
            self.store.create_developer(developer)?;
        }
        info!(count, "seeded default developer roster");
        Ok(count)
    }

    /// Normalizes raw provider records and stores every valid, unseen task.
    pub fn import_provider_records(
        &self,
        provider: &str,
        records: &[serde_json::Value],
    ) -> ServiceResult<ImportReport> {
        let batch = normalize_records(records, provider);
        let mut report = ImportReport {
            rejected: batch.rejected.len(),
            ..ImportReport::default()
        };
        for err in &batch.rejected {
            warn!(provider, error = %err, "provider record skipped");
        }

        for task in batch.tasks {
            if let Err(err) = validate_new_task(&task) {
                warn!(provider, error = %err, "provider task failed validation");
                report.rejected += 1;
                continue;
            }
            match self.store.create_task(task) {
                Ok(_) => report.created += 1,
                Err(PersistenceError::Duplicate { external_id, .. }) => {
                    debug!(provider, external_id, "provider task already stored");
                    report.duplicates += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            provider,
            created = report.created,
            duplicates = report.duplicates,
            rejected = report.rejected,
            "provider import finished"
        );
        Ok(report)
    }

    /// Same as [`Self::import_provider_records`] for a raw JSON array body.
    pub fn import_provider_payload(&self, provider: &str, body: &str) -> ServiceResult<ImportReport> {
        let records: Vec<serde_json::Value> =
            serde_json::from_str(body).map_err(|err| ProviderError::Payload(err.to_string()))?;
        self.import_provider_records(provider, &records)
    }

    /// Schedules every stored task across every stored developer.
    pub fn schedule_assignments(&self) -> ServiceResult<ScheduleResult> {
        let tasks = self.store.list_tasks(Page::all())?;
        let developers = self.store.list_developers()?;

        let result = match schedule_with_observer(
            &tasks,
            &developers,
            &self.config,
            &mut TracingObserver,
        ) {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "scheduling failed");
                return Err(err.into());
            }
        };

        info!(
            tasks = tasks.len(),
            developers = developers.len(),
            weeks = result.total_weeks,
            total_cost = result.total_effective_cost,
            "schedule computed"
        );

        if self.persist_assignments {
            self.store.save_assignments(&result)?;
            debug!(rows = result.task_count(), "assignments persisted");
        }
        Ok(result)
    }

    pub fn list_assignments(&self) -> ServiceResult<Vec<AssignmentRecord>> {
        Ok(self.store.list_assignments()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn service() -> PlannerService {
        PlannerService::new(Arc::new(MemoryStore::new()), SchedulerConfig::default())
    }

    #[test]
    fn seed_only_fills_an_empty_roster() {
        let service = service();
        assert_eq!(service.seed_developers().unwrap(), 5);
        assert_eq!(service.seed_developers().unwrap(), 0);
        assert_eq!(service.list_developers().unwrap().len(), 5);
    }

    #[test]
    fn create_task_validates_before_storing() {
        let service = service();
        let err = service
            .create_task(NewTask::new(1, "Task 1", 5, 11, "mock-one"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(service.list_tasks(Page::all()).unwrap().is_empty());
    }

    #[test]
    fn schedule_persists_only_when_enabled() {
        let store: Arc<dyn PlannerStore> = Arc::new(MemoryStore::new());
        let service = PlannerService::new(store.clone(), SchedulerConfig::default());
        service.seed_developers().unwrap();
        service
            .create_task(NewTask::new(1, "Task 1", 5, 3, "mock-one"))
            .unwrap();

        service.schedule_assignments().unwrap();
        assert!(service.list_assignments().unwrap().is_empty());

        let service =
            PlannerService::new(store, SchedulerConfig::default()).with_persisted_assignments(true);
        let result = service.schedule_assignments().unwrap();
        assert_eq!(result.total_weeks, 1);
        assert_eq!(service.list_assignments().unwrap().len(), 1);
    }
}
