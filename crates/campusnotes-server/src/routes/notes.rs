//! Note browsing, upload, ratings and reports

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use campusnotes_core::notes::{Note, NoteFilter};
use campusnotes_core::ratings::Rating;
use campusnotes_core::reports::Report;
use campusnotes_core::services::UploadRequest;
use campusnotes_core::Error;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, MaybeUser};
use crate::state::SharedState;

#[derive(Deserialize, Default)]
pub struct BrowseParams {
    pub university_id: Option<String>,
    pub subject_id: Option<String>,
    pub branch_id: Option<String>,
    pub semester: Option<i64>,
    pub uploader_id: Option<String>,
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<BrowseParams>,
) -> ApiResult<Json<Vec<Note>>> {
    let filter = NoteFilter {
        university_id: params.university_id,
        subject_id: params.subject_id,
        branch_id: params.branch_id,
        semester: params.semester,
        uploader_id: params.uploader_id,
        search: params.search,
        status: None,
    };
    let notes = state.note_service().browse(filter).await?;
    Ok(Json(notes))
}

pub async fn get(
    State(state): State<SharedState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    let note = state
        .note_service()
        .get(&id, viewer.actor().as_ref())
        .await?;
    Ok(Json(note))
}

/// Multipart upload: metadata fields plus a `file` part
pub async fn upload(
    State(state): State<SharedState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let mut title = None;
    let mut description = None;
    let mut university_id = None;
    let mut subject_id = None;
    let mut branch_id = None;
    let mut semester = None;
    let mut filename = None;
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "university_id" => university_id = Some(read_text(field).await?),
            "subject_id" => subject_id = Some(read_text(field).await?),
            "branch_id" => branch_id = Some(read_text(field).await?),
            "semester" => {
                let value = read_text(field).await?;
                semester = Some(value.parse::<i64>().map_err(|_| {
                    bad_multipart(format!("'{}' is not a valid semester", value))
                })?);
            }
            "file" => {
                filename = Some(field.file_name().unwrap_or("upload.bin").to_string());
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| bad_multipart(e.to_string()))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let request = UploadRequest {
        title: title.ok_or_else(|| missing_field("title"))?,
        description: description.filter(|d| !d.is_empty()),
        university_id: university_id.ok_or_else(|| missing_field("university_id"))?,
        subject_id: subject_id.ok_or_else(|| missing_field("subject_id"))?,
        branch_id: branch_id.ok_or_else(|| missing_field("branch_id"))?,
        semester: semester.ok_or_else(|| missing_field("semester"))?,
        filename: filename.ok_or_else(|| missing_field("file"))?,
        data: data.ok_or_else(|| missing_field("file"))?,
    };

    let note = state.note_service().upload(&user.actor(), request).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn remove(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.note_service().delete(&id, &user.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn download(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    let note = state.note_service().download(&id).await?;
    Ok(Json(note))
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub stars: i64,
    pub comment: Option<String>,
}

pub async fn rate(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<RateRequest>,
) -> ApiResult<Json<Note>> {
    let note = state
        .note_service()
        .rate(&id, &user.actor(), request.stars, request.comment)
        .await?;
    Ok(Json(note))
}

pub async fn unrate(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Note>> {
    let note = state.note_service().unrate(&id, &user.actor()).await?;
    Ok(Json(note))
}

pub async fn list_ratings(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Rating>>> {
    let ratings = state.note_service().ratings(&id).await?;
    Ok(Json(ratings))
}

#[derive(Deserialize)]
pub struct ReportRequest {
    pub reason: String,
}

pub async fn report(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let report = state
        .note_service()
        .report(&id, &user.actor(), &request.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|e| bad_multipart(e.to_string()))
}

fn bad_multipart(detail: String) -> ApiError {
    ApiError(Error::Validation(detail))
}

fn missing_field(name: &str) -> ApiError {
    ApiError(Error::Validation(format!("Missing field '{}'", name)))
}
