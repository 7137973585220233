use super::{PersistenceError, PersistenceResult};
use crate::task_validation::{validate_new_developer, validate_new_task};
use crate::{NewDeveloper, NewTask, ScheduleResult, ScheduleSummary};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleSnapshot<'a> {
    summary: ScheduleSummary,
    #[serde(flatten)]
    result: &'a ScheduleResult,
}

pub fn save_schedule_to_json<P: AsRef<Path>>(
    result: &ScheduleResult,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = ScheduleSnapshot {
        summary: result.summary(),
        result,
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct AssignmentCsvRecord {
    week: u32,
    developer_id: i64,
    developer: String,
    task_id: i64,
    external_id: i64,
    task: String,
    difficulty: i64,
    duration: i64,
    effective_cost: f64,
}

pub fn save_schedule_to_csv<P: AsRef<Path>>(
    result: &ScheduleResult,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for week in &result.assignments {
        for dt in &week.developer_tasks {
            for task in &dt.tasks {
                writer.serialize(AssignmentCsvRecord {
                    week: week.week,
                    developer_id: dt.developer.id,
                    developer: dt.developer.full_name(),
                    task_id: task.id,
                    external_id: task.external_id,
                    task: task.name.clone(),
                    difficulty: task.difficulty,
                    duration: task.duration,
                    effective_cost: dt.developer.effective_cost(task),
                })?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct TaskCsvRecord {
    external_id: i64,
    name: String,
    duration: i64,
    difficulty: i64,
    provider: String,
}

impl From<TaskCsvRecord> for NewTask {
    fn from(record: TaskCsvRecord) -> Self {
        NewTask::new(
            record.external_id,
            record.name,
            record.duration,
            record.difficulty,
            record.provider,
        )
    }
}

#[derive(Debug, Deserialize)]
struct DeveloperCsvRecord {
    first_name: String,
    last_name: String,
    email: String,
    capacity: i64,
}

impl From<DeveloperCsvRecord> for NewDeveloper {
    fn from(record: DeveloperCsvRecord) -> Self {
        NewDeveloper::new(
            record.first_name,
            record.last_name,
            record.email,
            record.capacity,
        )
    }
}

fn checked_tasks(tasks: Vec<NewTask>) -> PersistenceResult<Vec<NewTask>> {
    for (idx, task) in tasks.iter().enumerate() {
        validate_new_task(task)
            .map_err(|err| PersistenceError::InvalidData(format!("task #{idx}: {err}")))?;
    }
    Ok(tasks)
}

fn checked_developers(developers: Vec<NewDeveloper>) -> PersistenceResult<Vec<NewDeveloper>> {
    for (idx, developer) in developers.iter().enumerate() {
        validate_new_developer(developer)
            .map_err(|err| PersistenceError::InvalidData(format!("developer #{idx}: {err}")))?;
    }
    Ok(developers)
}

/// Reads a JSON array of task create requests (camelCase keys).
pub fn load_tasks_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<NewTask>> {
    let file = File::open(path)?;
    let tasks: Vec<NewTask> = serde_json::from_reader(file)?;
    checked_tasks(tasks)
}

/// Reads tasks from a CSV with header
/// `external_id,name,duration,difficulty,provider`.
pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<NewTask>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into());
    }
    checked_tasks(tasks)
}

pub fn load_developers_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<NewDeveloper>> {
    let file = File::open(path)?;
    let developers: Vec<NewDeveloper> = serde_json::from_reader(file)?;
    checked_developers(developers)
}

/// Header: `first_name,last_name,email,capacity`.
pub fn load_developers_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<NewDeveloper>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut developers = Vec::new();
    for record in reader.deserialize::<DeveloperCsvRecord>() {
        developers.push(record?.into());
    }
    checked_developers(developers)
}
