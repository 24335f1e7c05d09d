use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod application_repository;
pub mod payment_repository;
pub mod tuition_repository;
pub mod user_repository;

pub use application_repository::SqliteApplicationRepository;
pub use payment_repository::SqlitePaymentRepository;
pub use tuition_repository::SqliteTuitionRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait TuitionRepository: Send + Sync {
    async fn create(&self, request: CreateTuitionRequest) -> Result<Tuition>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tuition>>;
    async fn list(&self, posted_by_email: Option<&str>) -> Result<Vec<Tuition>>;
    async fn update_status(&self, id: Uuid, status: TuitionStatus) -> Result<Tuition>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, request: CreateApplicationRequest) -> Result<Application>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>>;
    async fn list(&self, tutor_email: Option<&str>) -> Result<Vec<Application>>;
    async fn list_latest(&self, limit: i64) -> Result<Vec<Application>>;
    async fn update_status(&self, id: Uuid, status: ApplicationStatus) -> Result<Application>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create-if-absent keyed on email. Returns the stored user and
    /// whether this call inserted it.
    async fn create_if_absent(&self, request: CreateUserRequest) -> Result<(User, bool)>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn search(&self, search_text: Option<&str>, limit: i64) -> Result<Vec<User>>;
    async fn update_role(&self, id: Uuid, role: UserRole) -> Result<User>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts a payment record. Fails with `AppError::Conflict` if a
    /// record already exists for the same transaction_id; this is the
    /// storage-level guard that makes confirmation idempotent under
    /// concurrent retries.
    async fn create(&self, payment: PaymentRecord) -> Result<PaymentRecord>;
    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentRecord>>;
    async fn list(&self, student_email: Option<&str>) -> Result<Vec<PaymentRecord>>;
}
