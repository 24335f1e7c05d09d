pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::service::{PaymentService, ServiceContext};
use state::AppState;

/// Paths are flat, mirroring the public API contract of the original
/// deployment; do not nest them under a prefix.
pub fn create_app(
    service_context: Arc<ServiceContext>,
    payment_service: Option<Arc<PaymentService>>,
) -> Router {
    let app_state = AppState::new(service_context, payment_service);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Tuition postings
        .route("/tuitions", post(handlers::tuitions::create))
        .route("/tuitions", get(handlers::tuitions::list))
        .route("/tuitions/:id", get(handlers::tuitions::get))
        .route("/tuitions/:id", patch(handlers::tuitions::approve))
        .route("/tuitions/:id", delete(handlers::tuitions::delete))
        // Tutor applications
        .route("/applications", get(handlers::applications::list))
        .route("/applications", post(handlers::applications::create))
        .route("/latest-applications", get(handlers::applications::latest))
        .route("/applications/:id", patch(handlers::applications::reject))
        // Users
        .route("/users", post(handlers::users::create))
        .route("/users", get(handlers::users::search))
        // Param name stays :id for matchit's sake; the value is an email
        .route("/users/:id/role", get(handlers::users::role))
        .route("/users/:id", patch(handlers::users::update_role))
        .route("/users/:id", delete(handlers::users::delete))
        // Payments
        .route("/payment", get(handlers::payments::list))
        .route("/create-checkout-session", post(handlers::payments::create_checkout_session))
        .route("/payment-success", post(handlers::payments::payment_success))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}
