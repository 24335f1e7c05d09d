use std::sync::Arc;

use crate::service::{PaymentService, ServiceContext};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    /// Absent when no checkout provider is configured; payment routes
    /// answer 503 in that case.
    pub payment_service: Option<Arc<PaymentService>>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        payment_service: Option<Arc<PaymentService>>,
    ) -> Self {
        Self {
            service_context,
            payment_service,
        }
    }
}
