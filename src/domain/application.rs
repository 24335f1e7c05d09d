use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tutor's request to be matched to a tuition posting. Status moves to
/// Approved by a successful payment, or to Rejected by admin action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub tuition_id: Uuid,
    pub student_email: String,
    pub tutor_email: String,
    pub tutor_name: String,
    pub expected_salary: i64,
    pub status: ApplicationStatus,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub tuition_id: Uuid,
    pub student_email: String,
    pub tutor_email: String,
    pub tutor_name: String,
    pub expected_salary: i64,
}
