use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{CreateCheckoutRequest, PaymentRecord, PaymentStatus},
    error::{AppError, Result},
    service::{ConfirmationOutcome, PaymentService},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    id: Uuid,
    tuition_id: Uuid,
    application_id: Uuid,
    transaction_id: String,
    student_email: String,
    tutor_name: String,
    tutor_email: String,
    /// Whole currency units; the record stores provider minor units.
    amount: f64,
    status: PaymentStatus,
    paid_at: String,
}

impl From<PaymentRecord> for PaymentDto {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id,
            tuition_id: record.tuition_id,
            application_id: record.application_id,
            transaction_id: record.transaction_id,
            student_email: record.student_email,
            tutor_name: record.tutor_name,
            tutor_email: record.tutor_email,
            amount: record.amount_cents as f64 / 100.0,
            status: record.status,
            paid_at: record.paid_at.to_rfc3339(),
        }
    }
}

fn payment_service(state: &AppState) -> Result<Arc<PaymentService>> {
    state.payment_service.clone().ok_or_else(|| {
        AppError::ServiceUnavailable("Checkout provider is not configured".to_string())
    })
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PaymentDto>>> {
    let payments = state
        .service_context
        .payment_repo
        .list(params.email.as_deref())
        .await?;

    let payments: Vec<PaymentDto> = payments.into_iter().map(Into::into).collect();

    Ok(Json(payments))
}

#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<CheckoutSessionResponse>> {
    let url = payment_service(&state)?.create_checkout(&request).await?;

    Ok(Json(CheckoutSessionResponse { url }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessRequest {
    pub session_id: String,
}

/// Confirmation always answers; the non-finalizing paths that the
/// original flow dropped on the floor each get an explicit response.
pub async fn payment_success(
    State(state): State<AppState>,
    Json(request): Json<PaymentSuccessRequest>,
) -> Result<Response> {
    let outcome = payment_service(&state)?.confirm(&request.session_id).await?;

    let response = match outcome {
        ConfirmationOutcome::Finalized {
            transaction_id,
            order_id,
        } => (
            StatusCode::OK,
            Json(json!({
                "transactionId": transaction_id,
                "orderId": order_id,
            })),
        ),
        ConfirmationOutcome::AlreadyProcessed { transaction_id } => (
            StatusCode::OK,
            Json(json!({
                "status": "already_processed",
                "transactionId": transaction_id,
            })),
        ),
        ConfirmationOutcome::SessionIncomplete => (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({
                "status": "session_incomplete",
            })),
        ),
        ConfirmationOutcome::DanglingReference => {
            return Err(AppError::NotFound(
                "Session does not reference a known application".to_string(),
            ));
        }
    };

    Ok(response.into_response())
}
