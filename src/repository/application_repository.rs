use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Application, ApplicationStatus, CreateApplicationRequest},
    error::{AppError, Result},
    repository::ApplicationRepository,
};

#[derive(FromRow)]
struct ApplicationRow {
    id: String,
    tuition_id: String,
    student_email: String,
    tutor_email: String,
    tutor_name: String,
    expected_salary: i64,
    status: String,
    date: NaiveDateTime,
}

pub struct SqliteApplicationRepository {
    pool: SqlitePool,
}

impl SqliteApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_application(row: ApplicationRow) -> Result<Application> {
        Ok(Application {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            tuition_id: Uuid::parse_str(&row.tuition_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            student_email: row.student_email,
            tutor_email: row.tutor_email,
            tutor_name: row.tutor_name,
            expected_salary: row.expected_salary,
            status: Self::parse_status(&row.status)?,
            date: DateTime::from_naive_utc_and_offset(row.date, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<ApplicationStatus> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(AppError::Database(format!("Invalid application status: {}", s))),
        }
    }

    fn status_to_str(status: &ApplicationStatus) -> &'static str {
        match status {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[async_trait]
impl ApplicationRepository for SqliteApplicationRepository {
    async fn create(&self, request: CreateApplicationRequest) -> Result<Application> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();
        let status_str = Self::status_to_str(&ApplicationStatus::Pending);

        sqlx::query(
            r#"
            INSERT INTO applications (
                id, tuition_id, student_email, tutor_email, tutor_name,
                expected_salary, status, date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(request.tuition_id.to_string())
        .bind(&request.student_email)
        .bind(&request.tutor_email)
        .bind(&request.tutor_name)
        .bind(request.expected_salary)
        .bind(status_str)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created application".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, tuition_id, student_email, tutor_email, tutor_name,
                   expected_salary, status, date
            FROM applications
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_application(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, tutor_email: Option<&str>) -> Result<Vec<Application>> {
        let rows = match tutor_email {
            Some(email) => {
                sqlx::query_as::<_, ApplicationRow>(
                    r#"
                    SELECT id, tuition_id, student_email, tutor_email, tutor_name,
                           expected_salary, status, date
                    FROM applications
                    WHERE tutor_email = ?
                    ORDER BY date DESC
                    "#,
                )
                .bind(email)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ApplicationRow>(
                    r#"
                    SELECT id, tuition_id, student_email, tutor_email, tutor_name,
                           expected_salary, status, date
                    FROM applications
                    ORDER BY date DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_application).collect()
    }

    async fn list_latest(&self, limit: i64) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, tuition_id, student_email, tutor_email, tutor_name,
                   expected_salary, status, date
            FROM applications
            ORDER BY date DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_application).collect()
    }

    async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Result<Application> {
        let id_str = id.to_string();
        let status_str = Self::status_to_str(&status);

        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = ?
            WHERE id = ?
            "#,
        )
        .bind(status_str)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Application not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated application".to_string())
        })
    }
}
