use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CreateTuitionRequest, Tuition, TuitionStatus},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    email: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateTuitionRequest>,
) -> Result<(StatusCode, Json<Tuition>)> {
    let tuition = state.service_context.tuition_repo.create(request).await?;

    Ok((StatusCode::CREATED, Json(tuition)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Tuition>>> {
    let tuitions = state
        .service_context
        .tuition_repo
        .list(params.email.as_deref())
        .await?;

    Ok(Json(tuitions))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tuition>> {
    let tuition = state
        .service_context
        .tuition_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tuition not found".to_string()))?;

    Ok(Json(tuition))
}

/// Admin approval: PATCH always moves the posting to approved.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tuition>> {
    let tuition = state
        .service_context
        .tuition_repo
        .update_status(id, TuitionStatus::Approved)
        .await?;

    Ok(Json(tuition))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.tuition_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
