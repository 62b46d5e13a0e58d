//! HTTP routes and handlers

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use probabilitas_classifiers::EvaluationResult;
use probabilitas_core::{Attribute, AttributeId, ClassId, ClassRecord, Project, ProjectId};
use probabilitas_store::{NewProject, ProjectSummary, Workspace};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:project", delete(delete_project))
        .route("/workspace/:project", get(show_workspace))
        .route("/workspace/:project/attributes", post(add_attribute))
        .route(
            "/workspace/:project/attributes/:attribute",
            patch(update_attribute),
        )
        .route("/workspace/:project/classes", post(add_class))
        .route("/workspace/:project/classes/:class", patch(update_class))
        .route("/workspace/:project/training-data", post(update_training_data))
        .route("/analysis/:project", post(analyze))
        .route("/analysis/:project/report", post(analysis_report))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

async fn list_projects(State(state): State<AppState>) -> Json<Vec<ProjectSummary>> {
    record_request("list_projects");
    Json(state.store.list_projects())
}

async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    record_request("create_project");
    let project = state.store.create_project(req)?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(project): Path<ProjectId>,
) -> Result<StatusCode, AppError> {
    record_request("delete_project");
    state.store.delete_project(project)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn show_workspace(
    State(state): State<AppState>,
    Path(project): Path<ProjectId>,
) -> Result<Json<Workspace>, AppError> {
    record_request("show_workspace");
    Ok(Json(state.store.workspace(project)?))
}

#[derive(Debug, Deserialize)]
struct NameRequest {
    name: String,
}

#[derive(Debug, Serialize)]
struct AttributeResponse {
    success: bool,
    attribute: Attribute,
}

#[derive(Debug, Serialize)]
struct ClassResponse {
    success: bool,
    class: ClassRecord,
}

async fn update_attribute(
    State(state): State<AppState>,
    Path((project, attribute)): Path<(ProjectId, AttributeId)>,
    Json(req): Json<NameRequest>,
) -> Result<Json<AttributeResponse>, AppError> {
    record_request("update_attribute");
    let attribute = state.store.rename_attribute(project, attribute, &req.name)?;
    Ok(Json(AttributeResponse {
        success: true,
        attribute,
    }))
}

/// Class edit; `prior_probability: 0` resets the class to the uniform prior
#[derive(Debug, Deserialize)]
struct UpdateClassRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    prior_probability: Option<f64>,
}

async fn update_class(
    State(state): State<AppState>,
    Path((project, class)): Path<(ProjectId, ClassId)>,
    Json(req): Json<UpdateClassRequest>,
) -> Result<Json<ClassResponse>, AppError> {
    record_request("update_class");
    let class = state.store.update_class(
        project,
        class,
        req.name.as_deref(),
        req.prior_probability,
    )?;
    Ok(Json(ClassResponse {
        success: true,
        class,
    }))
}

async fn add_attribute(
    State(state): State<AppState>,
    Path(project): Path<ProjectId>,
    Json(req): Json<NameRequest>,
) -> Result<Json<AttributeResponse>, AppError> {
    record_request("add_attribute");
    let attribute = state.store.add_attribute(project, &req.name)?;
    Ok(Json(AttributeResponse {
        success: true,
        attribute,
    }))
}

async fn add_class(
    State(state): State<AppState>,
    Path(project): Path<ProjectId>,
    Json(req): Json<NameRequest>,
) -> Result<Json<ClassResponse>, AppError> {
    record_request("add_class");
    let class = state.store.add_class(project, &req.name)?;
    Ok(Json(ClassResponse {
        success: true,
        class,
    }))
}

#[derive(Debug, Deserialize)]
struct TrainingDataRequest {
    class_id: ClassId,
    attribute_id: AttributeId,
    is_associated: bool,
}

async fn update_training_data(
    State(state): State<AppState>,
    Path(project): Path<ProjectId>,
    Json(req): Json<TrainingDataRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    record_request("update_training_data");
    state
        .store
        .upsert_training(project, req.class_id, req.attribute_id, req.is_associated)?;
    Ok(Json(json!({ "success": true })))
}

/// Analysis request body shared by the JSON and report endpoints
#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    selected_attributes: Vec<AttributeId>,
}

async fn analyze(
    State(state): State<AppState>,
    Path(project): Path<ProjectId>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<EvaluationResult>, AppError> {
    record_request("analyze");
    let (_, result) = state.evaluate(project, &req.selected_attributes)?;
    if let Some(top) = result.top() {
        info!(
            project = %project,
            class = %top.class_code,
            percentage = top.percentage,
            "analysis complete"
        );
    }
    Ok(Json(result))
}

async fn analysis_report(
    State(state): State<AppState>,
    Path(project): Path<ProjectId>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Html<String>, AppError> {
    record_request("analysis_report");
    let (snapshot, result) = state.evaluate(project, &req.selected_attributes)?;

    // Every id was validated by the engine, so each one resolves.
    let selected: Vec<&Attribute> = req
        .selected_attributes
        .iter()
        .filter_map(|id| snapshot.attributes.iter().find(|a| a.id == *id))
        .collect();

    let html = state
        .reports
        .render(&snapshot.project, &snapshot.attributes, &selected, &result)?;
    Ok(Html(html))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

fn record_request(endpoint: &'static str) {
    metrics::counter!("probabilitas_requests_total", "endpoint" => endpoint).increment(1);
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Internal(String),
}

impl From<probabilitas_core::Error> for AppError {
    fn from(err: probabilitas_core::Error) -> Self {
        match err {
            probabilitas_core::Error::Validation(msg) => AppError::Validation(msg),
            err @ probabilitas_core::Error::NotFound { .. } => AppError::NotFound(err.to_string()),
            err => AppError::Internal(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::Internal(msg) => {
                warn!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
