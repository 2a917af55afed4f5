use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    EntryDraft, ScheduleEntry, ScheduleEntryInput, ScheduleError, ScheduleRepository, WeekView,
    entry::parse_study_date,
    export::{self, ExportError, ExportFormat},
};

#[derive(Clone)]
pub struct AppState {
    repository: Arc<ScheduleRepository>,
}

impl AppState {
    pub fn new(repository: ScheduleRepository) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Runs `op` against the repository on tokio's blocking pool.
    async fn blocking<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&ScheduleRepository) -> Result<T, ApiError> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        tokio::task::spawn_blocking(move || op(&repository))
            .await
            .map_err(|err| {
                error!(error = %err, "repository task failed");
                ApiError::Internal(err.to_string())
            })?
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::Validation(err) => ApiError::Invalid(err.to_string()),
            ScheduleError::NotFound(id) => ApiError::NotFound(format!("schedule {id} not found")),
            ScheduleError::Storage(err) => {
                error!(error = %err, "storage failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(value: ExportError) -> Self {
        error!(error = %value, "export failure");
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct WeekQuery {
    date: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/calendar/week", get(week_view))
        .route("/export/csv", get(export_csv))
        .route("/export/pdf", get(export_pdf))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, repository: ScheduleRepository) -> std::io::Result<()> {
    let app = router(AppState::new(repository));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "study schedule HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_entries(State(state): State<AppState>) -> Result<Json<Vec<ScheduleEntry>>, ApiError> {
    let entries = state.blocking(|repo| Ok(repo.list_all()?)).await?;
    Ok(Json(entries))
}

async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let entry = state.blocking(move |repo| Ok(repo.get(id)?)).await?;
    Ok(Json(entry))
}

async fn create_entry(
    State(state): State<AppState>,
    Json(draft): Json<EntryDraft>,
) -> Result<(StatusCode, Json<ScheduleEntry>), ApiError> {
    let input = ScheduleEntryInput::try_from(draft).map_err(|err| ApiError::invalid(err.to_string()))?;
    let created = state
        .blocking(move |repo| {
            let id = repo.create(&input)?;
            Ok(repo.get(id)?)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<EntryDraft>,
) -> Result<Json<ScheduleEntry>, ApiError> {
    let input = ScheduleEntryInput::try_from(draft).map_err(|err| ApiError::invalid(err.to_string()))?;
    let updated = state
        .blocking(move |repo| {
            repo.update(id, &input)?;
            Ok(repo.get(id)?)
        })
        .await?;
    Ok(Json(updated))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.blocking(move |repo| Ok(repo.delete(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn week_view(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekView>, ApiError> {
    let reference = match query.date.as_deref() {
        Some(raw) => parse_study_date(raw).map_err(|err| ApiError::invalid(err.to_string()))?,
        None => today(),
    };
    let entries = state.blocking(|repo| Ok(repo.list_all()?)).await?;
    Ok(Json(WeekView::project(reference, &entries)))
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .blocking(|repo| Ok(export::to_csv(&repo.list_all()?)?))
        .await?;
    Ok(attachment(ExportFormat::Csv, body))
}

async fn export_pdf(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .blocking(|repo| Ok(export::to_pdf(&repo.list_all()?)?))
        .await?;
    Ok(attachment(ExportFormat::Pdf, body))
}

fn attachment(format: ExportFormat, body: Vec<u8>) -> Response {
    let file_name = export::export_file_name(format, today());
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
