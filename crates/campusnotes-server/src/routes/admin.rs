//! Admin moderation endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use campusnotes_core::content::ContactMessage;
use campusnotes_core::notes::{Note, NoteStatus};
use campusnotes_core::reports::{Report, ReportStatus};
use campusnotes_core::Error;

use crate::error::ApiResult;
use crate::extract::AdminUser;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct NoteQueueQuery {
    pub status: Option<String>,
}

pub async fn list_notes(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Query(query): Query<NoteQueueQuery>,
) -> ApiResult<Json<Vec<Note>>> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            NoteStatus::parse(raw)
                .ok_or_else(|| Error::Validation(format!("Unknown status '{}'", raw)))?,
        ),
        None => None,
    };

    let notes = state.moderation_service().notes(status).await?;
    Ok(Json(notes))
}

pub async fn approve_note(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    Ok(Json(state.moderation_service().approve_note(&id).await?))
}

pub async fn reject_note(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    Ok(Json(state.moderation_service().reject_note(&id).await?))
}

#[derive(Deserialize)]
pub struct ReportQueueQuery {
    pub status: Option<String>,
}

pub async fn list_reports(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Query(query): Query<ReportQueueQuery>,
) -> ApiResult<Json<Vec<Report>>> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            ReportStatus::parse(raw)
                .ok_or_else(|| Error::Validation(format!("Unknown status '{}'", raw)))?,
        ),
        None => Some(ReportStatus::Open),
    };

    let reports = state.moderation_service().reports(status).await?;
    Ok(Json(reports))
}

#[derive(Deserialize, Default)]
pub struct ResolveRequest {
    #[serde(default)]
    pub remove_note: bool,
}

pub async fn resolve_report(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<Json<Report>> {
    let report = state
        .moderation_service()
        .resolve_report(&id, request.remove_note)
        .await?;
    Ok(Json(report))
}

pub async fn dismiss_report(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Report>> {
    Ok(Json(state.moderation_service().dismiss_report(&id).await?))
}

#[derive(Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub unread_only: bool,
}

pub async fn list_messages(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Query(query): Query<MessageQuery>,
) -> ApiResult<Json<Vec<ContactMessage>>> {
    let messages = state.contact_service().list(query.unread_only).await?;
    Ok(Json(messages))
}

pub async fn mark_message_read(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.contact_service().mark_read(&id).await?;
    Ok(Json(serde_json::json!({ "status": "read" })))
}
