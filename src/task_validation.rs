use crate::developer::NewDeveloper;
use crate::task::NewTask;
use thiserror::Error;

pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 10;
pub const MAX_DURATION: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TaskValidationError {
    message: String,
}

impl TaskValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn check_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), TaskValidationError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(TaskValidationError::new(format!(
            "{field} must be between {min} and {max} characters (got {len})"
        )));
    }
    Ok(())
}

pub fn validate_new_task(task: &NewTask) -> Result<(), TaskValidationError> {
    if task.external_id <= 0 {
        return Err(TaskValidationError::new(format!(
            "externalId must be a positive integer (got {})",
            task.external_id
        )));
    }

    check_length("name", &task.name, 3, 100)?;

    if task.duration < 1 || task.duration > MAX_DURATION {
        return Err(TaskValidationError::new(format!(
            "task {} has duration {} outside 1..={MAX_DURATION}",
            task.external_id, task.duration
        )));
    }

    if task.difficulty < MIN_DIFFICULTY || task.difficulty > MAX_DIFFICULTY {
        return Err(TaskValidationError::new(format!(
            "task {} has difficulty {} outside {MIN_DIFFICULTY}..={MAX_DIFFICULTY}",
            task.external_id, task.difficulty
        )));
    }

    check_length("provider", &task.provider, 3, 150)?;

    Ok(())
}

/// Capacity is not checked; a developer with a non-positive capacity is stored
/// but never scheduled.
pub fn validate_new_developer(developer: &NewDeveloper) -> Result<(), TaskValidationError> {
    if developer.first_name.trim().is_empty() || developer.last_name.trim().is_empty() {
        return Err(TaskValidationError::new(
            "developer first and last name are required",
        ));
    }
    if !developer.email.contains('@') {
        return Err(TaskValidationError::new(format!(
            "developer email '{}' is not a valid address",
            developer.email
        )));
    }
    Ok(())
}
