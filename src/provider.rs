//! Normalization of raw task records published by external providers.
//!
//! Two record shapes are understood:
//!
//! * `{ "id": 1, "zorluk": 3, "sure": 5 }` where `zorluk` is the difficulty
//!   and `sure` the duration;
//! * `{ "id": 1, "value": 3, "estimated_duration": 5 }`.
//!
//! Anything else is rejected record by record; one bad record never sinks the
//! rest of a batch.

use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;

use crate::NewTask;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("provider payload is not a JSON array of records: {0}")]
    Payload(String),
    #[error("record #{index}: unknown provider format")]
    UnknownFormat { index: usize },
    #[error("record #{index}: field '{field}' is missing or not a number")]
    InvalidField { index: usize, field: &'static str },
}

struct RecordShape {
    difficulty: &'static str,
    duration: &'static str,
}

const SHAPES: [RecordShape; 2] = [
    RecordShape {
        difficulty: "zorluk",
        duration: "sure",
    },
    RecordShape {
        difficulty: "value",
        duration: "estimated_duration",
    },
];

#[derive(Debug, Default)]
pub struct ProviderBatch {
    pub tasks: Vec<NewTask>,
    pub rejected: Vec<ProviderError>,
}

fn number(raw: &Value, index: usize, field: &'static str) -> Result<i64, ProviderError> {
    raw.get(field)
        .and_then(Value::as_f64)
        .map(|v| v as i64)
        .ok_or(ProviderError::InvalidField { index, field })
}

/// Maps a single provider record to a task create request tagged with
/// `provider`.
pub fn normalize_record(raw: &Value, provider: &str, index: usize) -> Result<NewTask, ProviderError> {
    let shape = SHAPES
        .iter()
        .find(|shape| raw.get(shape.difficulty).is_some())
        .ok_or(ProviderError::UnknownFormat { index })?;

    let id = number(raw, index, "id")?;
    let duration = number(raw, index, shape.duration)?;
    let difficulty = number(raw, index, shape.difficulty)?;

    Ok(NewTask::new(id, format!("Task {id}"), duration, difficulty, provider))
}

/// Parses a JSON array body and normalizes every record. Output order follows
/// the input order.
pub fn parse_provider_payload(body: &str, provider: &str) -> Result<ProviderBatch, ProviderError> {
    let records: Vec<Value> =
        serde_json::from_str(body).map_err(|err| ProviderError::Payload(err.to_string()))?;
    Ok(normalize_records(&records, provider))
}

pub fn normalize_records(records: &[Value], provider: &str) -> ProviderBatch {
    let results: Vec<Result<NewTask, ProviderError>> = records
        .par_iter()
        .enumerate()
        .map(|(index, raw)| normalize_record(raw, provider, index))
        .collect();

    let mut batch = ProviderBatch::default();
    for result in results {
        match result {
            Ok(task) => batch.tasks.push(task),
            Err(err) => batch.rejected.push(err),
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_both_record_shapes() {
        let first = normalize_record(&json!({ "id": 7, "zorluk": 3, "sure": 5 }), "mock-one", 0)
            .unwrap();
        assert_eq!(first, NewTask::new(7, "Task 7", 5, 3, "mock-one"));

        let second = normalize_record(
            &json!({ "id": 8, "value": 9, "estimated_duration": 11 }),
            "mock-two",
            0,
        )
        .unwrap();
        assert_eq!(second, NewTask::new(8, "Task 8", 11, 9, "mock-two"));
    }

    #[test]
    fn rejects_unknown_and_malformed_records() {
        let err = normalize_record(&json!({ "id": 1, "weight": 3 }), "p", 4).unwrap_err();
        assert_eq!(err, ProviderError::UnknownFormat { index: 4 });

        let err = normalize_record(&json!({ "id": 1, "zorluk": "hard", "sure": 2 }), "p", 2)
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::InvalidField {
                index: 2,
                field: "zorluk"
            }
        );
    }

    #[test]
    fn batch_keeps_order_and_collects_rejections() {
        let body = r#"[
            {"id": 1, "zorluk": 2, "sure": 3},
            {"id": 2, "nope": true},
            {"id": 3, "value": 4, "estimated_duration": 6}
        ]"#;
        let batch = parse_provider_payload(body, "mock").unwrap();
        let ids: Vec<i64> = batch.tasks.iter().map(|t| t.external_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(batch.rejected, vec![ProviderError::UnknownFormat { index: 1 }]);
    }

    #[test]
    fn non_array_payload_is_an_error() {
        assert!(matches!(
            parse_provider_payload("{\"id\": 1}", "mock"),
            Err(ProviderError::Payload(_))
        ));
    }
}
