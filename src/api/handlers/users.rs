use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CreateUserRequest, User, UserRole},
    error::Result,
};

const USER_SEARCH_LIMIT: i64 = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    search_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub created: bool,
    pub id: Uuid,
}

/// Idempotent create-if-absent keyed on email. The second call for the
/// same email answers 200 with created=false and leaves the stored user
/// untouched.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>)> {
    let (user, created) = state
        .service_context
        .user_repo
        .create_if_absent(request)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(CreateUserResponse { created, id: user.id })))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<User>>> {
    let users = state
        .service_context
        .user_repo
        .search(params.search_text.as_deref(), USER_SEARCH_LIMIT)
        .await?;

    Ok(Json(users))
}

/// Unknown emails report the default role rather than 404; first sign-in
/// happens before the user document exists.
pub async fn role(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let role = state
        .service_context
        .user_repo
        .find_by_email(&email)
        .await?
        .map(|user| user.role)
        .unwrap_or_default();

    Ok(Json(json!({ "role": role })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<User>> {
    let user = state
        .service_context
        .user_repo
        .update_role(id, request.role)
        .await?;

    Ok(Json(user))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service_context.user_repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
