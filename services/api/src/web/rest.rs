//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use study_planner_core::domain::{
    Id, NewPdf, NewSchedule, NewSession, PdfDocument, PdfUpdate, ScheduleUpdate, StudySchedule,
    StudySession, UserStats,
};
use study_planner_core::pipeline::{AiScheduleOutcome, AiScheduleRequest};
use study_planner_core::schedule::PlanError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_user_stats_handler,
        list_schedules_handler,
        create_schedule_handler,
        get_schedule_handler,
        update_schedule_handler,
        delete_schedule_handler,
        list_sessions_handler,
        create_session_handler,
        list_pdfs_handler,
        upload_pdf_handler,
        get_pdf_handler,
        update_pdf_handler,
        delete_pdf_handler,
        ai_generate_schedule_handler,
    ),
    components(schemas(ErrorMessage)),
    tags(
        (name = "Study Planner API", description = "Study schedules, sessions, PDFs and AI-generated plans.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Response Helpers
//=========================================================================================

/// Error payload returned by every endpoint: a human-readable message.
#[derive(Serialize, ToSchema)]
pub struct ErrorMessage {
    pub message: String,
}

type ErrorResponse = (StatusCode, Json<ErrorMessage>);
type ApiResult<T> = Result<T, ErrorResponse>;

fn reply_error(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (
        status,
        Json(ErrorMessage {
            message: message.into(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ErrorResponse {
    reply_error(StatusCode::BAD_REQUEST, message)
}

fn not_found(message: impl Into<String>) -> ErrorResponse {
    reply_error(StatusCode::NOT_FOUND, message)
}

fn internal(message: impl Into<String>) -> ErrorResponse {
    reply_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

//=========================================================================================
// Stats
//=========================================================================================

/// Aggregate study statistics for a user.
#[utoipa::path(
    get,
    path = "/api/user/{user_id}/stats",
    responses(
        (status = 200, description = "Total hours, session count and current streak"),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    params(("user_id" = i64, Path, description = "The user's id"))
)]
pub async fn get_user_stats_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Id>,
) -> ApiResult<Json<UserStats>> {
    let stats = state.store.user_stats(user_id).await.map_err(|e| {
        error!("Failed to get user stats: {:?}", e);
        internal("Failed to get user stats")
    })?;
    Ok(Json(stats))
}

//=========================================================================================
// Schedules
//=========================================================================================

/// Lists a user's study schedules.
#[utoipa::path(
    get,
    path = "/api/user/{user_id}/schedules",
    responses(
        (status = 200, description = "The user's schedules"),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    params(("user_id" = i64, Path, description = "The user's id"))
)]
pub async fn list_schedules_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Id>,
) -> ApiResult<Json<Vec<StudySchedule>>> {
    let schedules = state.store.schedules_by_user(user_id).await.map_err(|e| {
        error!("Failed to list schedules: {:?}", e);
        internal("Failed to get schedules")
    })?;
    Ok(Json(schedules))
}

fn validate_new_schedule(schedule: &NewSchedule) -> Result<(), ErrorResponse> {
    if schedule.title.trim().is_empty() {
        return Err(bad_request("Invalid schedule data: title is required"));
    }
    if schedule.subjects.is_empty() {
        return Err(bad_request(
            "Invalid schedule data: subjects must not be empty",
        ));
    }
    if !(1..=24).contains(&schedule.hours_per_day) {
        return Err(bad_request(
            "Invalid schedule data: hoursPerDay must be between 1 and 24",
        ));
    }
    if schedule.is_ai_generated && (schedule.weekly_plan.is_none() || schedule.exam_date.is_none())
    {
        return Err(bad_request(
            "Invalid schedule data: AI-generated schedules require weeklyPlan and examDate",
        ));
    }
    Ok(())
}

/// Creates a schedule from a manual form submission.
#[utoipa::path(
    post,
    path = "/api/user/{user_id}/schedules",
    request_body(content_type = "application/json", description = "The schedule to create"),
    responses(
        (status = 200, description = "The created schedule"),
        (status = 400, description = "Invalid schedule data", body = ErrorMessage)
    ),
    params(("user_id" = i64, Path, description = "The user's id"))
)]
pub async fn create_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Id>,
    Json(schedule): Json<NewSchedule>,
) -> ApiResult<Json<StudySchedule>> {
    validate_new_schedule(&schedule)?;
    let created = state
        .store
        .create_schedule(user_id, schedule)
        .await
        .map_err(|e| {
            error!("Failed to create schedule: {:?}", e);
            internal("Failed to create schedule")
        })?;
    Ok(Json(created))
}

/// Fetches a single schedule by id.
#[utoipa::path(
    get,
    path = "/api/schedules/{id}",
    responses(
        (status = 200, description = "The schedule"),
        (status = 404, description = "Schedule not found", body = ErrorMessage)
    ),
    params(("id" = i64, Path, description = "The schedule id"))
)]
pub async fn get_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<StudySchedule>> {
    let schedule = state
        .store
        .get_schedule(id)
        .await
        .map_err(|e| {
            error!("Failed to get schedule: {:?}", e);
            internal("Failed to get schedule")
        })?
        .ok_or_else(|| not_found("Schedule not found"))?;
    Ok(Json(schedule))
}

/// Applies a partial update to a schedule.
#[utoipa::path(
    put,
    path = "/api/schedules/{id}",
    request_body(content_type = "application/json", description = "Fields to update"),
    responses(
        (status = 200, description = "The updated schedule"),
        (status = 400, description = "Invalid update", body = ErrorMessage),
        (status = 404, description = "Schedule not found", body = ErrorMessage)
    ),
    params(("id" = i64, Path, description = "The schedule id"))
)]
pub async fn update_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(updates): Json<ScheduleUpdate>,
) -> ApiResult<Json<StudySchedule>> {
    if let Some(hours) = updates.hours_per_day {
        if !(1..=24).contains(&hours) {
            return Err(bad_request(
                "Invalid schedule data: hoursPerDay must be between 1 and 24",
            ));
        }
    }
    if let Some(subjects) = &updates.subjects {
        if subjects.is_empty() {
            return Err(bad_request(
                "Invalid schedule data: subjects must not be empty",
            ));
        }
    }
    let updated = state
        .store
        .update_schedule(id, updates)
        .await
        .map_err(|e| {
            error!("Failed to update schedule: {:?}", e);
            internal("Failed to update schedule")
        })?
        .ok_or_else(|| not_found("Schedule not found"))?;
    Ok(Json(updated))
}

/// Deletes a schedule. Sessions that pointed at it are kept, with their
/// reference nulled out.
#[utoipa::path(
    delete,
    path = "/api/schedules/{id}",
    responses(
        (status = 200, description = "Schedule deleted"),
        (status = 404, description = "Schedule not found", body = ErrorMessage)
    ),
    params(("id" = i64, Path, description = "The schedule id"))
)]
pub async fn delete_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<ErrorMessage>> {
    let deleted = state.store.delete_schedule(id).await.map_err(|e| {
        error!("Failed to delete schedule: {:?}", e);
        internal("Failed to delete schedule")
    })?;
    if !deleted {
        return Err(not_found("Schedule not found"));
    }
    Ok(Json(ErrorMessage {
        message: "Schedule deleted successfully".to_string(),
    }))
}

//=========================================================================================
// Study Sessions
//=========================================================================================

#[derive(Deserialize)]
pub struct SessionsQuery {
    limit: Option<usize>,
}

/// Lists a user's most recent study sessions, newest first.
#[utoipa::path(
    get,
    path = "/api/user/{user_id}/sessions",
    responses(
        (status = 200, description = "Recent sessions"),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    params(
        ("user_id" = i64, Path, description = "The user's id"),
        ("limit" = Option<usize>, Query, description = "Maximum sessions to return, default 10")
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Id>,
    Query(query): Query<SessionsQuery>,
) -> ApiResult<Json<Vec<StudySession>>> {
    let limit = query.limit.unwrap_or(10);
    let sessions = state
        .store
        .recent_sessions(user_id, limit)
        .await
        .map_err(|e| {
            error!("Failed to list sessions: {:?}", e);
            internal("Failed to get sessions")
        })?;
    Ok(Json(sessions))
}

/// Records a completed study session.
#[utoipa::path(
    post,
    path = "/api/user/{user_id}/sessions",
    request_body(content_type = "application/json", description = "The completed session"),
    responses(
        (status = 200, description = "The recorded session"),
        (status = 400, description = "Invalid session data", body = ErrorMessage)
    ),
    params(("user_id" = i64, Path, description = "The user's id"))
)]
pub async fn create_session_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Id>,
    Json(session): Json<NewSession>,
) -> ApiResult<Json<StudySession>> {
    if session.duration == 0 {
        return Err(bad_request("Invalid session data: duration must be positive"));
    }
    if session.subject.trim().is_empty() {
        return Err(bad_request("Invalid session data: subject is required"));
    }
    let created = state
        .store
        .create_session(user_id, session)
        .await
        .map_err(|e| {
            error!("Failed to create session: {:?}", e);
            internal("Failed to create session")
        })?;
    Ok(Json(created))
}

//=========================================================================================
// PDF Documents
//=========================================================================================

/// Lists a user's uploaded PDFs.
#[utoipa::path(
    get,
    path = "/api/user/{user_id}/pdfs",
    responses(
        (status = 200, description = "The user's PDFs"),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    params(("user_id" = i64, Path, description = "The user's id"))
)]
pub async fn list_pdfs_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Id>,
) -> ApiResult<Json<Vec<PdfDocument>>> {
    let pdfs = state.store.pdfs_by_user(user_id).await.map_err(|e| {
        error!("Failed to list PDFs: {:?}", e);
        internal("Failed to get PDFs")
    })?;
    Ok(Json(pdfs))
}

/// Uploads a PDF for the text-to-speech reader.
///
/// Accepts multipart/form-data with a `pdf` file part and an optional
/// `title` text part.
#[utoipa::path(
    post,
    path = "/api/user/{user_id}/pdfs",
    request_body(content_type = "multipart/form-data", description = "The PDF to upload"),
    responses(
        (status = 200, description = "The stored PDF record"),
        (status = 400, description = "No file uploaded", body = ErrorMessage)
    ),
    params(("user_id" = i64, Path, description = "The user's id"))
)]
pub async fn upload_pdf_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Id>,
    mut multipart: Multipart,
) -> ApiResult<Json<PdfDocument>> {
    let mut filename: Option<String> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("pdf") => {
                filename = Some(field.file_name().unwrap_or("untitled.pdf").to_string());
                // The bytes are not stored; only the document record is kept.
                field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read file bytes: {}", e)))?;
            }
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read title: {}", e)))?;
                if !text.trim().is_empty() {
                    title = Some(text);
                }
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| bad_request("No file uploaded"))?;
    let pdf = NewPdf {
        title: title.unwrap_or_else(|| filename.clone()),
        filename,
    };

    let created = state.store.create_pdf(user_id, pdf).await.map_err(|e| {
        error!("Failed to create PDF: {:?}", e);
        internal("Failed to upload PDF")
    })?;
    Ok(Json(created))
}

/// Fetches a single PDF record by id.
#[utoipa::path(
    get,
    path = "/api/pdfs/{id}",
    responses(
        (status = 200, description = "The PDF record"),
        (status = 404, description = "PDF not found", body = ErrorMessage)
    ),
    params(("id" = i64, Path, description = "The PDF id"))
)]
pub async fn get_pdf_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<PdfDocument>> {
    let pdf = state
        .store
        .get_pdf(id)
        .await
        .map_err(|e| {
            error!("Failed to get PDF: {:?}", e);
            internal("Failed to get PDF")
        })?
        .ok_or_else(|| not_found("PDF not found"))?;
    Ok(Json(pdf))
}

/// Updates a PDF record, typically the reader position.
#[utoipa::path(
    put,
    path = "/api/pdfs/{id}",
    request_body(content_type = "application/json", description = "Fields to update"),
    responses(
        (status = 200, description = "The updated PDF record"),
        (status = 404, description = "PDF not found", body = ErrorMessage)
    ),
    params(("id" = i64, Path, description = "The PDF id"))
)]
pub async fn update_pdf_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
    Json(updates): Json<PdfUpdate>,
) -> ApiResult<Json<PdfDocument>> {
    let updated = state
        .store
        .update_pdf(id, updates)
        .await
        .map_err(|e| {
            error!("Failed to update PDF: {:?}", e);
            internal("Failed to update PDF")
        })?
        .ok_or_else(|| not_found("PDF not found"))?;
    Ok(Json(updated))
}

/// Deletes a PDF record. Schedules generated from it are kept, with their
/// reference nulled out.
#[utoipa::path(
    delete,
    path = "/api/pdfs/{id}",
    responses(
        (status = 200, description = "PDF deleted"),
        (status = 404, description = "PDF not found", body = ErrorMessage)
    ),
    params(("id" = i64, Path, description = "The PDF id"))
)]
pub async fn delete_pdf_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Id>,
) -> ApiResult<Json<ErrorMessage>> {
    let deleted = state.store.delete_pdf(id).await.map_err(|e| {
        error!("Failed to delete PDF: {:?}", e);
        internal("Failed to delete PDF")
    })?;
    if !deleted {
        return Err(not_found("PDF not found"));
    }
    Ok(Json(ErrorMessage {
        message: "PDF deleted successfully".to_string(),
    }))
}

//=========================================================================================
// AI Schedule Generation
//=========================================================================================

/// Generates a study schedule from an uploaded edital PDF.
///
/// Accepts multipart/form-data with an `editalPdf` file part, an `examDate`
/// text part (ISO `YYYY-MM-DD`) and an optional `title`. The edital is
/// analyzed by the LLM when available; on any failure the deterministic
/// heuristic analyzer takes over, so this endpoint only fails on invalid
/// input or an internal error.
#[utoipa::path(
    post,
    path = "/api/user/{user_id}/schedules/ai-generate",
    request_body(content_type = "multipart/form-data", description = "The edital PDF and exam date"),
    responses(
        (status = 200, description = "The generated schedule and analysis summary"),
        (status = 400, description = "Missing file or invalid exam date", body = ErrorMessage),
        (status = 500, description = "Schedule generation failed", body = ErrorMessage)
    ),
    params(("user_id" = i64, Path, description = "The user's id"))
)]
pub async fn ai_generate_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Id>,
    mut multipart: Multipart,
) -> ApiResult<Json<AiScheduleOutcome>> {
    let mut filename: Option<String> = None;
    let mut pdf_bytes: Vec<u8> = Vec::new();
    let mut exam_date_str: Option<String> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("editalPdf") => {
                filename = Some(field.file_name().unwrap_or("edital.pdf").to_string());
                pdf_bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read file bytes: {}", e)))?
                    .to_vec();
            }
            Some("examDate") => {
                exam_date_str = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("Failed to read examDate: {}", e)))?,
                );
            }
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read title: {}", e)))?;
                if !text.trim().is_empty() {
                    title = Some(text);
                }
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| bad_request("PDF do edital é obrigatório"))?;
    let exam_date_str =
        exam_date_str.ok_or_else(|| bad_request("Data do concurso é obrigatória"))?;
    let exam_date = exam_date_str
        .parse::<NaiveDate>()
        .map_err(|_| bad_request("Data do concurso inválida"))?;

    let request = AiScheduleRequest {
        filename,
        pdf_bytes,
        exam_date,
        title,
    };

    match state.planner.generate(user_id, request).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(PlanError::Validation(message)) => Err(bad_request(message)),
        Err(e) => {
            error!("Schedule generation failed: {:?}", e);
            Err(internal(e.to_string()))
        }
    }
}
