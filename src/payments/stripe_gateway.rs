use std::time::Duration;

use async_trait::async_trait;
use stripe::{
    CheckoutSession, CheckoutSessionId, CheckoutSessionMode, CheckoutSessionStatus, Client,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, Currency, StripeError,
};

use crate::{
    domain::CreateCheckoutRequest,
    error::{AppError, Result},
    payments::{CheckoutGateway, SessionDetails, SessionStatus},
};

// Provider calls have no retry policy; a timed-out confirmation is safe
// to resubmit once the transaction_id uniqueness guard is in place.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

pub struct StripeGateway {
    client: Client,
    client_base_url: String,
}

impl StripeGateway {
    pub fn new(api_key: String, client_base_url: String) -> Self {
        let client = Client::new(api_key);
        Self {
            client,
            client_base_url,
        }
    }

    fn map_stripe_error(err: StripeError) -> AppError {
        match err {
            StripeError::Stripe(ref request_error) if request_error.http_status == 404 => {
                AppError::NotFound("Checkout session not found".to_string())
            }
            _ => AppError::External(format!("Stripe error: {}", err)),
        }
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_session(&self, request: &CreateCheckoutRequest) -> Result<String> {
        let success_url = format!(
            "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            self.client_base_url
        );
        let cancel_url = format!("{}/payment-cancelled", self.client_base_url);

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&success_url);
        params.cancel_url = Some(&cancel_url);
        params.customer_email = Some(&request.student_email);

        // Create line items with inline price data
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                currency: Currency::USD,
                unit_amount: Some(request.expected_salary * 100),
                product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: format!("Tuition fee for {}", request.tutor_name),
                    description: Some("Monthly tuition fee settlement".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            quantity: Some(1),
            ..Default::default()
        }]);

        // Metadata correlates the session back to our documents at
        // confirmation time.
        let mut metadata = std::collections::HashMap::new();
        metadata.insert("tuition_id".to_string(), request.tuition_id.to_string());
        metadata.insert("application_id".to_string(), request.application_id.to_string());
        metadata.insert("student_email".to_string(), request.student_email.clone());
        params.metadata = Some(metadata);

        let session = tokio::time::timeout(
            UPSTREAM_TIMEOUT,
            CheckoutSession::create(&self.client, params),
        )
        .await
        .map_err(|_| AppError::External("Checkout provider timed out".to_string()))?
        .map_err(Self::map_stripe_error)?;

        session
            .url
            .ok_or_else(|| AppError::External("No checkout URL returned".to_string()))
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        let id: CheckoutSessionId = session_id
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid checkout session id".to_string()))?;

        let session = tokio::time::timeout(
            UPSTREAM_TIMEOUT,
            CheckoutSession::retrieve(&self.client, &id, &[]),
        )
        .await
        .map_err(|_| AppError::External("Checkout provider timed out".to_string()))?
        .map_err(Self::map_stripe_error)?;

        let status = match session.status {
            Some(CheckoutSessionStatus::Complete) => SessionStatus::Complete,
            Some(CheckoutSessionStatus::Expired) => SessionStatus::Expired,
            _ => SessionStatus::Open,
        };

        Ok(SessionDetails {
            id: session.id.to_string(),
            status,
            payment_intent_id: session.payment_intent.map(|pi| pi.id().to_string()),
            amount_total: session.amount_total,
            customer_email: session.customer_email,
            metadata: session.metadata.unwrap_or_default(),
        })
    }
}
