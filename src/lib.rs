mod calculations;
pub mod config;
pub mod developer;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod observer;
pub mod persistence;
pub mod provider;
pub mod schedule;
pub mod service;
pub mod task;
pub mod task_validation;
pub mod telemetry;

pub use config::{ConfigError, PlannerConfig};
pub use developer::{Developer, NewDeveloper, default_roster, developers_frame};
pub use observer::{NoopObserver, ScheduleObserver, TracingObserver};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    AssignmentRecord, MemoryStore, Page, PersistenceError, PlannerStore, load_developers_from_csv,
    load_developers_from_json, load_tasks_from_csv, load_tasks_from_json, save_schedule_to_csv,
    save_schedule_to_json,
};
pub use provider::{ProviderBatch, ProviderError, parse_provider_payload};
pub use schedule::{
    DeveloperTasks, ScheduleError, ScheduleResult, ScheduleSummary, SchedulerConfig,
    WeeklyAssignment, schedule, schedule_with_observer,
};
pub use service::{ImportReport, PlannerService, ServiceError};
pub use task::{NewTask, Task, tasks_frame};
pub use task_validation::TaskValidationError;
