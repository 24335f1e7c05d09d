use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{Application, ApplicationStatus, CreateApplicationRequest},
    error::Result,
};

const LATEST_APPLICATIONS_LIMIT: i64 = 6;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    email: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Application>>> {
    let applications = state
        .service_context
        .application_repo
        .list(params.email.as_deref())
        .await?;

    Ok(Json(applications))
}

pub async fn latest(State(state): State<AppState>) -> Result<Json<Vec<Application>>> {
    let applications = state
        .service_context
        .application_repo
        .list_latest(LATEST_APPLICATIONS_LIMIT)
        .await?;

    Ok(Json(applications))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>)> {
    let application = state
        .service_context
        .application_repo
        .create(request)
        .await?;

    Ok((StatusCode::CREATED, Json(application)))
}

/// Admin rejection: PATCH always moves the application to rejected.
/// Approval happens only through payment confirmation.
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>> {
    let application = state
        .service_context
        .application_repo
        .update_status(id, ApplicationStatus::Rejected)
        .await?;

    Ok(Json(application))
}
