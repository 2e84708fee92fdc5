//! Server binary: wires configuration, adapters, subscribers, and the
//! HTTP router.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commerce_billing::adapters::events::InMemoryEventBus;
use commerce_billing::adapters::http::{api_router, AppState};
use commerce_billing::adapters::postgres::{
    PostgresCartService, PostgresCustomerService, PostgresOrderService,
    PostgresSubscriptionRepository, PostgresVariantService, PostgresWebhookEventRepository,
};
use commerce_billing::adapters::stripe::{StripeBillingAdapter, StripeConfig};
use commerce_billing::adapters::subscribers::{
    CartSubscriber, ProductVariantSubscriber, SubscriptionSubscriber,
};
use commerce_billing::application::handlers::billing::BillingEventTranslator;
use commerce_billing::config::AppConfig;
use commerce_billing::domain::billing::{IdempotentWebhookProcessor, StripeWebhookVerifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.server.log_level)?)
        .with(fmt::layer())
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "starting commerce-billing"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    // Adapters
    let subscription_repository = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let webhook_event_repository = Arc::new(PostgresWebhookEventRepository::new(pool.clone()));
    let cart_service = Arc::new(PostgresCartService::new(pool.clone()));
    let order_service = Arc::new(PostgresOrderService::new(pool.clone()));
    let variant_service = Arc::new(PostgresVariantService::new(pool.clone()));
    let customer_service = Arc::new(PostgresCustomerService::new(pool.clone()));

    let stripe_config = StripeConfig::new(
        config.payment.stripe_api_key.clone(),
        config.payment.stripe_webhook_secret.clone(),
    );
    let webhook_verifier = Arc::new(StripeWebhookVerifier::new(stripe_config.webhook_secret()));
    let billing_provider = Arc::new(StripeBillingAdapter::new(stripe_config));

    let event_bus = Arc::new(InMemoryEventBus::new());

    // Webhook pipeline: translator behind the idempotent processor
    let translator = Arc::new(BillingEventTranslator::new(
        cart_service.clone(),
        order_service.clone(),
        subscription_repository.clone(),
        event_bus.clone(),
    ));
    let webhook_processor = Arc::new(IdempotentWebhookProcessor::new(
        webhook_event_repository,
        translator,
    ));

    // Event subscribers
    Arc::new(ProductVariantSubscriber::new(
        variant_service.clone(),
        billing_provider.clone(),
    ))
    .attach(event_bus.as_ref())
    .await;
    Arc::new(CartSubscriber::new(
        cart_service.clone(),
        billing_provider.clone(),
    ))
    .attach(event_bus.as_ref())
    .await;
    SubscriptionSubscriber::attach(event_bus.as_ref()).await;

    let state = AppState {
        subscription_repository,
        cart_service,
        order_service,
        variant_service,
        customer_service,
        billing_provider,
        event_publisher: event_bus,
        webhook_verifier,
        webhook_processor,
        portal_return_url: config.payment.portal_return_url.clone(),
    };

    let app = api_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
