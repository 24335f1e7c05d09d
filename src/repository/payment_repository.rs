use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{PaymentRecord, PaymentStatus},
    error::{AppError, Result},
    repository::PaymentRepository,
};

#[derive(FromRow)]
struct PaymentRow {
    id: String,
    tuition_id: String,
    application_id: String,
    transaction_id: String,
    student_email: String,
    tutor_name: String,
    tutor_email: String,
    amount_cents: i64,
    status: String,
    paid_at: NaiveDateTime,
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PaymentRow) -> Result<PaymentRecord> {
        Ok(PaymentRecord {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            tuition_id: Uuid::parse_str(&row.tuition_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            application_id: Uuid::parse_str(&row.application_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            transaction_id: row.transaction_id,
            student_email: row.student_email,
            tutor_name: row.tutor_name,
            tutor_email: row.tutor_email,
            amount_cents: row.amount_cents,
            status: Self::parse_status(&row.status)?,
            paid_at: DateTime::from_naive_utc_and_offset(row.paid_at, Utc),
        })
    }

    fn parse_status(s: &str) -> Result<PaymentStatus> {
        match s {
            "success" => Ok(PaymentStatus::Success),
            _ => Err(AppError::Database(format!("Invalid payment status: {}", s))),
        }
    }

    fn status_to_str(status: &PaymentStatus) -> &'static str {
        match status {
            PaymentStatus::Success => "success",
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentRecord>> {
        let id_str = id.to_string();
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, tuition_id, application_id, transaction_id,
                   student_email, tutor_name, tutor_email, amount_cents,
                   status, paid_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id_str)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: PaymentRecord) -> Result<PaymentRecord> {
        let id_str = payment.id.to_string();
        let status_str = Self::status_to_str(&payment.status);
        let paid_at_naive = payment.paid_at.naive_utc();

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, tuition_id, application_id, transaction_id,
                student_email, tutor_name, tutor_email, amount_cents,
                status, paid_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(payment.tuition_id.to_string())
        .bind(payment.application_id.to_string())
        .bind(&payment.transaction_id)
        .bind(&payment.student_email)
        .bind(&payment.tutor_name)
        .bind(&payment.tutor_email)
        .bind(payment.amount_cents)
        .bind(status_str)
        .bind(paid_at_naive)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(
                format!("Payment already recorded for transaction {}", payment.transaction_id),
            ),
            _ => AppError::Database(e.to_string()),
        })?;

        self.find_by_id(payment.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created payment".to_string())
        })
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, tuition_id, application_id, transaction_id,
                   student_email, tutor_name, tutor_email, amount_cents,
                   status, paid_at
            FROM payments
            WHERE transaction_id = ?
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_payment(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, student_email: Option<&str>) -> Result<Vec<PaymentRecord>> {
        let rows = match student_email {
            Some(email) => {
                sqlx::query_as::<_, PaymentRow>(
                    r#"
                    SELECT id, tuition_id, application_id, transaction_id,
                           student_email, tutor_name, tutor_email, amount_cents,
                           status, paid_at
                    FROM payments
                    WHERE student_email = ?
                    ORDER BY paid_at DESC
                    "#,
                )
                .bind(email)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, PaymentRow>(
                    r#"
                    SELECT id, tuition_id, application_id, transaction_id,
                           student_email, tutor_name, tutor_email, amount_cents,
                           status, paid_at
                    FROM payments
                    ORDER BY paid_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_payment).collect()
    }
}
