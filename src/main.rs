use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tutorlink::{
    api,
    config::Settings,
    payments::StripeGateway,
    repository::{
        SqliteApplicationRepository, SqlitePaymentRepository, SqliteTuitionRepository,
        SqliteUserRepository,
    },
    service::{PaymentService, ServiceContext},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorlink=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting Tutorlink server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize repositories
    let tuition_repo = Arc::new(SqliteTuitionRepository::new(db_pool.clone()));
    let application_repo = Arc::new(SqliteApplicationRepository::new(db_pool.clone()));
    let user_repo = Arc::new(SqliteUserRepository::new(db_pool.clone()));
    let payment_repo = Arc::new(SqlitePaymentRepository::new(db_pool.clone()));

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        tuition_repo,
        application_repo.clone(),
        user_repo,
        payment_repo.clone(),
    ));

    // Initialize checkout gateway if configured
    let payment_service = if settings.stripe.enabled {
        if let Some(secret_key) = settings.stripe.secret_key.clone() {
            tracing::info!("Stripe payment processing enabled");
            let gateway = Arc::new(StripeGateway::new(
                secret_key,
                settings.client.base_url.clone(),
            ));
            Some(Arc::new(PaymentService::new(
                gateway,
                application_repo,
                payment_repo,
            )))
        } else {
            tracing::warn!("Stripe enabled but missing secret key");
            None
        }
    } else {
        tracing::info!("Stripe payment processing disabled");
        None
    };

    let app = api::create_app(service_context, payment_service);

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
