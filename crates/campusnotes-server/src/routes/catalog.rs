//! University, branch and subject endpoints; reads are public, writes admin

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use campusnotes_core::catalog::{Branch, Subject, University};

use crate::error::ApiResult;
use crate::extract::AdminUser;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct NameRequest {
    pub name: String,
}

pub async fn list_universities(
    State(state): State<SharedState>,
) -> ApiResult<Json<Vec<University>>> {
    Ok(Json(state.catalog_service().list_universities().await?))
}

pub async fn create_university(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<NameRequest>,
) -> ApiResult<(StatusCode, Json<University>)> {
    let university = state.catalog_service().create_university(&request.name).await?;
    Ok((StatusCode::CREATED, Json(university)))
}

pub async fn delete_university(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.catalog_service().delete_university(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_branches(State(state): State<SharedState>) -> ApiResult<Json<Vec<Branch>>> {
    Ok(Json(state.catalog_service().list_branches().await?))
}

pub async fn create_branch(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<NameRequest>,
) -> ApiResult<(StatusCode, Json<Branch>)> {
    let branch = state.catalog_service().create_branch(&request.name).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

pub async fn delete_branch(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.catalog_service().delete_branch(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SubjectQuery {
    pub university_id: Option<String>,
    pub branch_id: Option<String>,
}

pub async fn list_subjects(
    State(state): State<SharedState>,
    Query(query): Query<SubjectQuery>,
) -> ApiResult<Json<Vec<Subject>>> {
    let subjects = state
        .catalog_service()
        .list_subjects(query.university_id.as_deref(), query.branch_id.as_deref())
        .await?;
    Ok(Json(subjects))
}

#[derive(Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub university_id: String,
    pub branch_id: String,
    pub semester: i64,
}

pub async fn create_subject(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Json(request): Json<CreateSubjectRequest>,
) -> ApiResult<(StatusCode, Json<Subject>)> {
    let subject = state
        .catalog_service()
        .create_subject(
            &request.name,
            &request.university_id,
            &request.branch_id,
            request.semester,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn delete_subject(
    State(state): State<SharedState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.catalog_service().delete_subject(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
