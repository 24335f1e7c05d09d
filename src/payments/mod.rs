pub mod stripe_gateway;

pub use stripe_gateway::StripeGateway;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{domain::CreateCheckoutRequest, error::Result};

/// Provider-neutral view of a checkout session, reduced to the fields
/// the confirmation flow interprets.
#[derive(Debug, Clone)]
pub struct SessionDetails {
    pub id: String,
    pub status: SessionStatus,
    /// Identifier of the completed payment, unique per transaction.
    /// Absent until the provider has taken payment.
    pub payment_intent_id: Option<String>,
    /// Session total in the provider's minor units.
    pub amount_total: Option<i64>,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Complete,
    Expired,
}

/// Seam to the external checkout provider. Production uses
/// [`StripeGateway`]; tests substitute an in-memory fake.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Creates a provider-side session for the given payment request and
    /// returns the redirect URL. No local state is written here; the
    /// payment record only materializes at confirmation.
    async fn create_session(&self, request: &CreateCheckoutRequest) -> Result<String>;

    /// Retrieves a previously created session by id.
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails>;
}
