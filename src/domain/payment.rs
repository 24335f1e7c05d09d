use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Materialized once per completed external transaction, at confirmation
/// time. At most one record may exist per transaction_id; the storage
/// layer enforces this with a unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: Uuid,
    pub tuition_id: Uuid,
    pub application_id: Uuid,
    pub transaction_id: String,
    pub student_email: String,
    pub tutor_name: String,
    pub tutor_email: String,
    /// Provider minor units. The wire representation divides by 100.
    pub amount_cents: i64,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
}

/// Body of POST /create-checkout-session. The references are carried
/// into the provider session's metadata for correlation at confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub expected_salary: i64,
    pub tutor_name: String,
    pub tutor_email: String,
    pub tuition_id: Uuid,
    pub application_id: Uuid,
    pub student_email: String,
}
