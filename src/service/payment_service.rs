use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{ApplicationStatus, CreateCheckoutRequest, PaymentRecord, PaymentStatus},
    error::{AppError, Result},
    payments::{CheckoutGateway, SessionDetails, SessionStatus},
    repository::{ApplicationRepository, PaymentRepository},
};

/// Result of a confirmation attempt. Every path yields a variant; there
/// is no silent no-op branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// The payment was recorded and the application approved.
    Finalized {
        transaction_id: String,
        order_id: Uuid,
    },
    /// A record already exists for this transaction; nothing written.
    AlreadyProcessed { transaction_id: String },
    /// The provider has not completed the session yet; nothing written.
    SessionIncomplete,
    /// The session does not reference a known application.
    DanglingReference,
}

pub struct PaymentService {
    gateway: Arc<dyn CheckoutGateway>,
    application_repo: Arc<dyn ApplicationRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
}

impl PaymentService {
    pub fn new(
        gateway: Arc<dyn CheckoutGateway>,
        application_repo: Arc<dyn ApplicationRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            gateway,
            application_repo,
            payment_repo,
        }
    }

    /// Creates a provider checkout session for the given payment request
    /// and returns its redirect URL.
    pub async fn create_checkout(&self, request: &CreateCheckoutRequest) -> Result<String> {
        self.gateway.create_session(request).await
    }

    /// Finalizes a payment exactly once for the given checkout session.
    ///
    /// The read-then-write existence check below is advisory; the real
    /// idempotency guard is the unique constraint on transaction_id,
    /// which turns the losing side of a concurrent retry into
    /// `AlreadyProcessed` instead of a duplicate record.
    pub async fn confirm(&self, session_id: &str) -> Result<ConfirmationOutcome> {
        let session = self.gateway.retrieve_session(session_id).await?;

        let Some(application_id) = Self::metadata_uuid(&session, "application_id") else {
            return Ok(ConfirmationOutcome::DanglingReference);
        };
        let Some(tuition_id) = Self::metadata_uuid(&session, "tuition_id") else {
            return Ok(ConfirmationOutcome::DanglingReference);
        };

        let Some(application) = self.application_repo.find_by_id(application_id).await? else {
            return Ok(ConfirmationOutcome::DanglingReference);
        };

        if session.status != SessionStatus::Complete {
            return Ok(ConfirmationOutcome::SessionIncomplete);
        }
        let Some(transaction_id) = session.payment_intent_id.clone() else {
            return Ok(ConfirmationOutcome::SessionIncomplete);
        };

        if self
            .payment_repo
            .find_by_transaction_id(&transaction_id)
            .await?
            .is_some()
        {
            return Ok(ConfirmationOutcome::AlreadyProcessed { transaction_id });
        }

        let student_email = session
            .metadata
            .get("student_email")
            .cloned()
            .or_else(|| session.customer_email.clone())
            .unwrap_or_default();

        let record = PaymentRecord {
            id: Uuid::new_v4(),
            tuition_id,
            application_id,
            transaction_id: transaction_id.clone(),
            student_email,
            tutor_name: application.tutor_name.clone(),
            tutor_email: application.tutor_email.clone(),
            amount_cents: session.amount_total.unwrap_or_default(),
            status: PaymentStatus::Success,
            paid_at: Utc::now(),
        };

        let record = match self.payment_repo.create(record).await {
            Ok(record) => record,
            Err(AppError::Conflict(_)) => {
                return Ok(ConfirmationOutcome::AlreadyProcessed { transaction_id });
            }
            Err(e) => return Err(e),
        };

        // Not atomic with the insert above; a crash here leaves a payment
        // record with an unapproved application. Accepted window, see
        // DESIGN.md.
        self.application_repo
            .update_status(application.id, ApplicationStatus::Approved)
            .await?;

        tracing::info!(
            transaction_id = %transaction_id,
            order_id = %record.id,
            "Payment finalized"
        );

        Ok(ConfirmationOutcome::Finalized {
            transaction_id,
            order_id: record.id,
        })
    }

    fn metadata_uuid(session: &SessionDetails, key: &str) -> Option<Uuid> {
        session
            .metadata
            .get(key)
            .and_then(|value| Uuid::parse_str(value).ok())
    }
}
