use std::sync::Arc;

use serde_json::json;
use task_planner::{
    ImportReport, MemoryStore, NewDeveloper, NewTask, Page, PlannerService, PlannerStore,
    ScheduleError, SchedulerConfig, ServiceError,
};

fn service() -> PlannerService {
    PlannerService::new(Arc::new(MemoryStore::new()), SchedulerConfig::default())
}

#[test]
fn import_counts_created_duplicates_and_rejected() {
    let service = service();
    let records = vec![
        json!({ "id": 1, "zorluk": 3, "sure": 5 }),
        json!({ "id": 2, "value": 4, "estimated_duration": 9 }),
        json!({ "id": 3, "color": "blue" }),
        json!({ "id": 4, "zorluk": 55, "sure": 2 }),
    ];

    let report = service.import_provider_records("mock-one", &records).unwrap();
    assert_eq!(
        report,
        ImportReport {
            created: 2,
            duplicates: 0,
            rejected: 2
        }
    );

    let again = service.import_provider_records("mock-one", &records[..2]).unwrap();
    assert_eq!(again.created, 0);
    assert_eq!(again.duplicates, 2);

    let tasks = service.list_tasks(Page::all()).unwrap();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Task 1", "Task 2"]);
    assert_eq!(tasks[1].difficulty, 4);
    assert_eq!(tasks[1].duration, 9);
}

#[test]
fn import_payload_rejects_non_array_body() {
    let err = service()
        .import_provider_payload("mock-one", "{\"id\": 1}")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Provider(_)));
}

#[test]
fn schedule_over_seeded_roster() {
    let service = service();
    service.seed_developers().unwrap();
    for i in 1..=12 {
        service
            .create_task(NewTask::new(i, format!("Task {i}"), i, (i % 10) + 1, "mock-two"))
            .unwrap();
    }

    let result = service.schedule_assignments().unwrap();
    assert_eq!(result.task_count(), 12);
    assert_eq!(result.total_weeks, 1);
    assert_eq!(result.total_work_days, 5);
}

#[test]
fn schedule_surfaces_unschedulable_tasks() {
    let store: Arc<dyn PlannerStore> = Arc::new(MemoryStore::new());
    let service = PlannerService::new(store, SchedulerConfig::new(1.0, 5));
    service
        .create_developer(NewDeveloper::new("Solo", "Dev", "solo@example.com", 1))
        .unwrap();
    let task = service
        .create_task(NewTask::new(9, "Task 9", 5, 3, "mock-one"))
        .unwrap();

    match service.schedule_assignments().unwrap_err() {
        ServiceError::Schedule(ScheduleError::Unschedulable { week, task_ids }) => {
            assert_eq!(week, 1);
            assert_eq!(task_ids, vec![task.id]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn developers_without_capacity_are_stored_but_not_scheduled() {
    let service = service();
    service
        .create_developer(NewDeveloper::new("Idle", "Dev", "idle@example.com", 0))
        .unwrap();
    service
        .create_developer(NewDeveloper::new("Busy", "Dev", "busy@example.com", 2))
        .unwrap();
    service
        .create_task(NewTask::new(1, "Task 1", 3, 4, "mock-one"))
        .unwrap();

    assert_eq!(service.list_developers().unwrap().len(), 2);
    let result = service.schedule_assignments().unwrap();
    let holder = &result.assignments[0].developer_tasks[0].developer;
    assert_eq!(holder.first_name, "Busy");
}

#[test]
fn create_developer_requires_email() {
    let err = service()
        .create_developer(NewDeveloper::new("No", "Mail", "nomail", 2))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}
