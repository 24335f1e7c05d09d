use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student's request for a tutor. Subject and grade are opaque to the
/// backend; only the status field is ever interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tuition {
    pub id: Uuid,
    pub posted_by_email: String,
    pub subject: String,
    pub grade: String,
    pub location: Option<String>,
    pub expected_salary: i64,
    pub details: Option<String>,
    pub status: TuitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TuitionStatus {
    Pending,
    Approved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTuitionRequest {
    pub posted_by_email: String,
    pub subject: String,
    pub grade: String,
    pub location: Option<String>,
    pub expected_salary: i64,
    pub details: Option<String>,
}
