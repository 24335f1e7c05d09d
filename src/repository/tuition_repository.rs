use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateTuitionRequest, Tuition, TuitionStatus},
    error::{AppError, Result},
    repository::TuitionRepository,
};

// Database row struct that matches the SQLite schema
#[derive(FromRow)]
struct TuitionRow {
    id: String,
    posted_by_email: String,
    subject: String,
    grade: String,
    location: Option<String>,
    expected_salary: i64,
    details: Option<String>,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteTuitionRepository {
    pool: SqlitePool,
}

impl SqliteTuitionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_tuition(row: TuitionRow) -> Result<Tuition> {
        Ok(Tuition {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            posted_by_email: row.posted_by_email,
            subject: row.subject,
            grade: row.grade,
            location: row.location,
            expected_salary: row.expected_salary,
            details: row.details,
            status: Self::parse_status(&row.status)?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<TuitionStatus> {
        match s {
            "pending" => Ok(TuitionStatus::Pending),
            "approved" => Ok(TuitionStatus::Approved),
            _ => Err(AppError::Database(format!("Invalid tuition status: {}", s))),
        }
    }

    fn status_to_str(status: &TuitionStatus) -> &'static str {
        match status {
            TuitionStatus::Pending => "pending",
            TuitionStatus::Approved => "approved",
        }
    }
}

#[async_trait]
impl TuitionRepository for SqliteTuitionRepository {
    async fn create(&self, request: CreateTuitionRequest) -> Result<Tuition> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();
        let status_str = Self::status_to_str(&TuitionStatus::Pending);

        sqlx::query(
            r#"
            INSERT INTO tuitions (
                id, posted_by_email, subject, grade, location,
                expected_salary, details, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.posted_by_email)
        .bind(&request.subject)
        .bind(&request.grade)
        .bind(&request.location)
        .bind(request.expected_salary)
        .bind(&request.details)
        .bind(status_str)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created tuition".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tuition>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, TuitionRow>(
            r#"
            SELECT id, posted_by_email, subject, grade, location,
                   expected_salary, details, status, created_at, updated_at
            FROM tuitions
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_tuition(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, posted_by_email: Option<&str>) -> Result<Vec<Tuition>> {
        let rows = match posted_by_email {
            Some(email) => {
                sqlx::query_as::<_, TuitionRow>(
                    r#"
                    SELECT id, posted_by_email, subject, grade, location,
                           expected_salary, details, status, created_at, updated_at
                    FROM tuitions
                    WHERE posted_by_email = ?
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(email)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, TuitionRow>(
                    r#"
                    SELECT id, posted_by_email, subject, grade, location,
                           expected_salary, details, status, created_at, updated_at
                    FROM tuitions
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_tuition).collect()
    }

    async fn update_status(&self, id: Uuid, status: TuitionStatus) -> Result<Tuition> {
        let id_str = id.to_string();
        let status_str = Self::status_to_str(&status);
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE tuitions
            SET status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status_str)
        .bind(now)
        .bind(&id_str)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tuition not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated tuition".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let id_str = id.to_string();
        let result = sqlx::query("DELETE FROM tuitions WHERE id = ?")
            .bind(id_str)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tuition not found".to_string()));
        }

        Ok(())
    }
}
