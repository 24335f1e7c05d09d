pub mod payment_service;

pub use payment_service::{ConfirmationOutcome, PaymentService};

use std::sync::Arc;

use crate::repository::*;

pub struct ServiceContext {
    pub tuition_repo: Arc<dyn TuitionRepository>,
    pub application_repo: Arc<dyn ApplicationRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
}

impl ServiceContext {
    pub fn new(
        tuition_repo: Arc<dyn TuitionRepository>,
        application_repo: Arc<dyn ApplicationRepository>,
        user_repo: Arc<dyn UserRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            tuition_repo,
            application_repo,
            user_repo,
            payment_repo,
        }
    }
}
