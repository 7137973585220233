use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

mod metrics;

pub use metrics::HttpMetrics;

use crate::{
    AssignmentRecord, Developer, ImportReport, NewDeveloper, NewTask, Page, PersistenceError,
    PlannerService, ScheduleError, ServiceError, Task, WeeklyAssignment,
};

#[derive(Clone)]
pub struct AppState {
    service: Arc<PlannerService>,
    metrics: HttpMetrics,
}

impl AppState {
    pub fn new(service: PlannerService) -> prometheus::Result<Self> {
        Ok(Self {
            service: Arc::new(service),
            metrics: HttpMetrics::new()?,
        })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UnschedulableBody {
    error: &'static str,
    message: String,
    week: u32,
    task_ids: Vec<i64>,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Unschedulable {
        message: String,
        week: u32,
        task_ids: Vec<i64>,
    },
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => ApiError::Invalid(err.to_string()),
            ServiceError::Provider(err) => ApiError::Invalid(err.to_string()),
            ServiceError::Persistence(err @ PersistenceError::Duplicate { .. }) => {
                ApiError::Conflict(err.to_string())
            }
            ServiceError::Persistence(err) => ApiError::Internal(err.to_string()),
            ServiceError::Schedule(err) => {
                let message = err.to_string();
                let ScheduleError::Unschedulable { week, task_ids } = err;
                ApiError::Unschedulable {
                    message,
                    week,
                    task_ids,
                }
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        ApiError::Invalid(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        ApiError::Invalid(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                let body = Json(ErrorBody {
                    error: "not_found",
                    message,
                });
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Conflict(message) => {
                let body = Json(ErrorBody {
                    error: "conflict",
                    message,
                });
                (StatusCode::CONFLICT, body).into_response()
            }
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Unschedulable {
                message,
                week,
                task_ids,
            } => {
                let body = Json(UnschedulableBody {
                    error: "unschedulable",
                    message,
                    week,
                    task_ids,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            ApiError::Internal(message) => {
                error!(%message, "request failed");
                let body = Json(ErrorBody {
                    error: "internal_error",
                    message,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeveloperList {
    pub developers: Vec<Developer>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentList {
    pub assignments: Vec<AssignmentRecord>,
}

/// Body of `GET /tasks/schedule`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub assignments: Vec<WeeklyAssignment>,
    pub min_week: u32,
    pub total_work_day: u64,
    pub total_elapsed_work_hour: u64,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub provider: String,
    pub records: Vec<serde_json::Value>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/schedule", get(schedule_tasks))
        .route("/tasks/:id", get(get_task))
        .route("/developers", get(list_developers).post(create_developer))
        .route("/assignments", get(list_assignments))
        .route("/providers/import", post(import_provider))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::track_requests,
        ))
        .route("/metrics", get(metrics::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "task planner HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_tasks(
    State(state): State<AppState>,
    page: Result<Query<Page>, QueryRejection>,
) -> Result<Json<TaskList>, ApiError> {
    let Query(page) = page?;
    let tasks = state.service.list_tasks(page)?;
    Ok(Json(TaskList { tasks }))
}

async fn get_task(
    State(state): State<AppState>,
    task_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Task>, ApiError> {
    let Path(task_id) = task_id?;
    match state.service.get_task(task_id)? {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::NotFound(format!("task {task_id} not found"))),
    }
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let created = state.service.create_task(task)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn schedule_tasks(State(state): State<AppState>) -> Result<Json<ScheduleResponse>, ApiError> {
    let result = state.service.schedule_assignments()?;
    let summary = result.summary();
    Ok(Json(ScheduleResponse {
        assignments: result.assignments,
        min_week: summary.min_week,
        total_work_day: summary.total_work_day,
        total_elapsed_work_hour: summary.total_elapsed_work_hour,
    }))
}

async fn list_developers(State(state): State<AppState>) -> Result<Json<DeveloperList>, ApiError> {
    let developers = state.service.list_developers()?;
    Ok(Json(DeveloperList { developers }))
}

async fn create_developer(
    State(state): State<AppState>,
    Json(developer): Json<NewDeveloper>,
) -> Result<(StatusCode, Json<Developer>), ApiError> {
    let created = state.service.create_developer(developer)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_assignments(
    State(state): State<AppState>,
) -> Result<Json<AssignmentList>, ApiError> {
    let assignments = state.service.list_assignments()?;
    Ok(Json(AssignmentList { assignments }))
}

async fn import_provider(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportReport>, ApiError> {
    if request.provider.trim().is_empty() {
        return Err(ApiError::Invalid("provider must not be empty".to_string()));
    }
    let report = state
        .service
        .import_provider_records(&request.provider, &request.records)?;
    Ok(Json(report))
}
