use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use tutorlink::{
    domain::{
        ApplicationStatus, CreateApplicationRequest, CreateCheckoutRequest, CreateTuitionRequest,
        PaymentRecord, PaymentStatus,
    },
    error::{AppError, Result},
    payments::{CheckoutGateway, SessionDetails, SessionStatus},
    repository::{
        ApplicationRepository, PaymentRepository, SqliteApplicationRepository,
        SqlitePaymentRepository, SqliteTuitionRepository, TuitionRepository,
    },
    service::{ConfirmationOutcome, PaymentService},
};

/// In-memory stand-in for the checkout provider. Sessions start open;
/// tests drive them to completion explicitly.
#[derive(Default)]
struct FakeCheckoutGateway {
    sessions: Mutex<HashMap<String, SessionDetails>>,
}

impl FakeCheckoutGateway {
    fn complete_session(&self, session_id: &str, payment_intent_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(session_id).expect("unknown session");
        session.status = SessionStatus::Complete;
        session.payment_intent_id = Some(payment_intent_id.to_string());
    }

    fn insert_session(&self, session: SessionDetails) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }

    fn last_session_id(&self) -> String {
        self.sessions
            .lock()
            .unwrap()
            .keys()
            .next()
            .expect("no session created")
            .clone()
    }
}

#[async_trait]
impl CheckoutGateway for FakeCheckoutGateway {
    async fn create_session(&self, request: &CreateCheckoutRequest) -> Result<String> {
        let id = format!("cs_test_{}", Uuid::new_v4().simple());
        let mut metadata = HashMap::new();
        metadata.insert("tuition_id".to_string(), request.tuition_id.to_string());
        metadata.insert(
            "application_id".to_string(),
            request.application_id.to_string(),
        );
        metadata.insert("student_email".to_string(), request.student_email.clone());

        let session = SessionDetails {
            id: id.clone(),
            status: SessionStatus::Open,
            payment_intent_id: None,
            amount_total: Some(request.expected_salary * 100),
            customer_email: Some(request.student_email.clone()),
            metadata,
        };
        self.insert_session(session);

        Ok(format!("https://checkout.test/pay/{}", id))
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Checkout session not found".to_string()))
    }
}

async fn setup_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

struct Fixture {
    gateway: Arc<FakeCheckoutGateway>,
    application_repo: Arc<SqliteApplicationRepository>,
    payment_repo: Arc<SqlitePaymentRepository>,
    service: PaymentService,
}

fn build_fixture(pool: &SqlitePool) -> Fixture {
    let gateway = Arc::new(FakeCheckoutGateway::default());
    let application_repo = Arc::new(SqliteApplicationRepository::new(pool.clone()));
    let payment_repo = Arc::new(SqlitePaymentRepository::new(pool.clone()));
    let service = PaymentService::new(
        gateway.clone(),
        application_repo.clone(),
        payment_repo.clone(),
    );

    Fixture {
        gateway,
        application_repo,
        payment_repo,
        service,
    }
}

async fn seed_application(pool: &SqlitePool) -> anyhow::Result<(Uuid, Uuid)> {
    let tuition_repo = SqliteTuitionRepository::new(pool.clone());
    let tuition = tuition_repo
        .create(CreateTuitionRequest {
            posted_by_email: "student@example.com".to_string(),
            subject: "Mathematics".to_string(),
            grade: "10".to_string(),
            location: Some("Dhaka".to_string()),
            expected_salary: 150,
            details: None,
        })
        .await?;

    let application_repo = SqliteApplicationRepository::new(pool.clone());
    let application = application_repo
        .create(CreateApplicationRequest {
            tuition_id: tuition.id,
            student_email: "student@example.com".to_string(),
            tutor_email: "tutor@example.com".to_string(),
            tutor_name: "Tutor Person".to_string(),
            expected_salary: 150,
        })
        .await?;

    assert_eq!(application.status, ApplicationStatus::Pending);

    Ok((tuition.id, application.id))
}

#[tokio::test]
async fn test_checkout_to_confirmation_flow() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let fixture = build_fixture(&pool);
    let (tuition_id, application_id) = seed_application(&pool).await?;

    let url = fixture
        .service
        .create_checkout(&CreateCheckoutRequest {
            expected_salary: 150,
            tutor_name: "Tutor Person".to_string(),
            tutor_email: "tutor@example.com".to_string(),
            tuition_id,
            application_id,
            student_email: "student@example.com".to_string(),
        })
        .await?;
    assert!(url.starts_with("https://checkout.test/pay/"));

    // Nothing is persisted at session creation time
    assert!(fixture.payment_repo.list(None).await?.is_empty());

    let session_id = fixture.gateway.last_session_id();
    fixture.gateway.complete_session(&session_id, "pi_test_123");

    let outcome = fixture.service.confirm(&session_id).await?;
    let ConfirmationOutcome::Finalized {
        transaction_id,
        order_id,
    } = outcome
    else {
        panic!("expected Finalized, got {:?}", outcome);
    };
    assert_eq!(transaction_id, "pi_test_123");

    let record = fixture
        .payment_repo
        .find_by_transaction_id("pi_test_123")
        .await?
        .expect("payment record missing");
    assert_eq!(record.id, order_id);
    assert_eq!(record.tuition_id, tuition_id);
    assert_eq!(record.application_id, application_id);
    // amount is the session total in minor units
    assert_eq!(record.amount_cents, 150 * 100);
    assert_eq!(record.tutor_email, "tutor@example.com");
    assert_eq!(record.student_email, "student@example.com");

    let application = fixture
        .application_repo
        .find_by_id(application_id)
        .await?
        .expect("application missing");
    assert_eq!(application.status, ApplicationStatus::Approved);

    Ok(())
}

#[tokio::test]
async fn test_confirmation_is_idempotent() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let fixture = build_fixture(&pool);
    let (tuition_id, application_id) = seed_application(&pool).await?;

    fixture
        .service
        .create_checkout(&CreateCheckoutRequest {
            expected_salary: 200,
            tutor_name: "Tutor Person".to_string(),
            tutor_email: "tutor@example.com".to_string(),
            tuition_id,
            application_id,
            student_email: "student@example.com".to_string(),
        })
        .await?;
    let session_id = fixture.gateway.last_session_id();
    fixture.gateway.complete_session(&session_id, "pi_test_dup");

    let first = fixture.service.confirm(&session_id).await?;
    assert!(matches!(first, ConfirmationOutcome::Finalized { .. }));

    let second = fixture.service.confirm(&session_id).await?;
    assert_eq!(
        second,
        ConfirmationOutcome::AlreadyProcessed {
            transaction_id: "pi_test_dup".to_string()
        }
    );

    // Exactly one record for the transaction
    let records = fixture.payment_repo.list(None).await?;
    assert_eq!(records.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_incomplete_session_writes_nothing() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let fixture = build_fixture(&pool);
    let (tuition_id, application_id) = seed_application(&pool).await?;

    fixture
        .service
        .create_checkout(&CreateCheckoutRequest {
            expected_salary: 100,
            tutor_name: "Tutor Person".to_string(),
            tutor_email: "tutor@example.com".to_string(),
            tuition_id,
            application_id,
            student_email: "student@example.com".to_string(),
        })
        .await?;
    let session_id = fixture.gateway.last_session_id();

    // Session still open: no side effects
    let outcome = fixture.service.confirm(&session_id).await?;
    assert_eq!(outcome, ConfirmationOutcome::SessionIncomplete);
    assert!(fixture.payment_repo.list(None).await?.is_empty());

    let application = fixture
        .application_repo
        .find_by_id(application_id)
        .await?
        .expect("application missing");
    assert_eq!(application.status, ApplicationStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn test_dangling_reference_session() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let fixture = build_fixture(&pool);

    // Session metadata points at an application that does not exist
    let mut metadata = HashMap::new();
    metadata.insert("tuition_id".to_string(), Uuid::new_v4().to_string());
    metadata.insert("application_id".to_string(), Uuid::new_v4().to_string());
    fixture.gateway.insert_session(SessionDetails {
        id: "cs_test_dangling".to_string(),
        status: SessionStatus::Complete,
        payment_intent_id: Some("pi_test_dangling".to_string()),
        amount_total: Some(10000),
        customer_email: None,
        metadata,
    });

    let outcome = fixture.service.confirm("cs_test_dangling").await?;
    assert_eq!(outcome, ConfirmationOutcome::DanglingReference);
    assert!(fixture.payment_repo.list(None).await?.is_empty());

    Ok(())
}

fn payment_record(transaction_id: &str) -> PaymentRecord {
    PaymentRecord {
        id: Uuid::new_v4(),
        tuition_id: Uuid::new_v4(),
        application_id: Uuid::new_v4(),
        transaction_id: transaction_id.to_string(),
        student_email: "student@example.com".to_string(),
        tutor_name: "Tutor Person".to_string(),
        tutor_email: "tutor@example.com".to_string(),
        amount_cents: 15000,
        status: PaymentStatus::Success,
        paid_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_duplicate_transaction_insert_rejected_by_storage() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let repo = SqlitePaymentRepository::new(pool.clone());

    repo.create(payment_record("pi_test_unique")).await?;

    // Same transaction again: the unique constraint, not the caller,
    // must refuse the insert
    let err = repo
        .create(payment_record("pi_test_unique"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let records = repo.list(None).await?;
    assert_eq!(records.len(), 1);

    Ok(())
}

/// Delegates to the real repository but never sees an existing record,
/// reproducing the stale read of two confirmations racing past the
/// existence check before either insert lands.
struct StaleReadPaymentRepository {
    inner: Arc<SqlitePaymentRepository>,
}

#[async_trait]
impl PaymentRepository for StaleReadPaymentRepository {
    async fn create(&self, payment: PaymentRecord) -> Result<PaymentRecord> {
        self.inner.create(payment).await
    }

    async fn find_by_transaction_id(
        &self,
        _transaction_id: &str,
    ) -> Result<Option<PaymentRecord>> {
        Ok(None)
    }

    async fn list(&self, student_email: Option<&str>) -> Result<Vec<PaymentRecord>> {
        self.inner.list(student_email).await
    }
}

#[tokio::test]
async fn test_race_past_existence_check_reports_already_processed() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let fixture = build_fixture(&pool);
    let (tuition_id, application_id) = seed_application(&pool).await?;

    fixture
        .service
        .create_checkout(&CreateCheckoutRequest {
            expected_salary: 150,
            tutor_name: "Tutor Person".to_string(),
            tutor_email: "tutor@example.com".to_string(),
            tuition_id,
            application_id,
            student_email: "student@example.com".to_string(),
        })
        .await?;
    let session_id = fixture.gateway.last_session_id();
    fixture.gateway.complete_session(&session_id, "pi_test_race");

    let first = fixture.service.confirm(&session_id).await?;
    assert!(matches!(first, ConfirmationOutcome::Finalized { .. }));

    // Re-confirm through a repository that cannot see the first record,
    // so the unique constraint is the only guard left standing
    let stale_repo = Arc::new(StaleReadPaymentRepository {
        inner: fixture.payment_repo.clone(),
    });
    let racing_service = PaymentService::new(
        fixture.gateway.clone(),
        fixture.application_repo.clone(),
        stale_repo,
    );

    let second = racing_service.confirm(&session_id).await?;
    assert_eq!(
        second,
        ConfirmationOutcome::AlreadyProcessed {
            transaction_id: "pi_test_race".to_string()
        }
    );

    let records = fixture.payment_repo.list(None).await?;
    assert_eq!(records.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unknown_session_is_not_found() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let fixture = build_fixture(&pool);

    let err = fixture.service.confirm("cs_test_missing").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}
