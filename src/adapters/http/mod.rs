//! HTTP adapter: shared state, routers, and error mapping.

pub mod admin;
mod auth;
mod error;
pub mod hooks;
pub mod store;

pub use auth::{AuthenticatedAdmin, AuthenticatedCustomer};
pub use error::{ApiError, ErrorResponse};

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::handlers::billing::{
    CreatePortalSessionHandler, CreateSubscriptionPaymentHandler,
};
use crate::application::handlers::subscription::{
    DeleteSubscriptionHandler, GetSubscriptionHandler, ListSubscriptionsHandler,
    UpdateSubscriptionHandler,
};
use crate::domain::billing::{IdempotentWebhookProcessor, StripeWebhookVerifier};
use crate::ports::{
    BillingProvider, CartService, CustomerService, EventPublisher, OrderService,
    SubscriptionRepository, VariantService,
};

/// Shared application state containing all dependencies.
///
/// Cloned per request; every dependency is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    pub cart_service: Arc<dyn CartService>,
    pub order_service: Arc<dyn OrderService>,
    pub variant_service: Arc<dyn VariantService>,
    pub customer_service: Arc<dyn CustomerService>,
    pub billing_provider: Arc<dyn BillingProvider>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub webhook_verifier: Arc<StripeWebhookVerifier>,
    pub webhook_processor: Arc<IdempotentWebhookProcessor>,
    pub portal_return_url: String,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn list_subscriptions_handler(&self) -> ListSubscriptionsHandler {
        ListSubscriptionsHandler::new(self.subscription_repository.clone())
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscription_repository.clone())
    }

    pub fn update_subscription_handler(&self) -> UpdateSubscriptionHandler {
        UpdateSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn delete_subscription_handler(&self) -> DeleteSubscriptionHandler {
        DeleteSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn create_portal_session_handler(&self) -> CreatePortalSessionHandler {
        CreatePortalSessionHandler::new(
            self.customer_service.clone(),
            self.billing_provider.clone(),
            self.portal_return_url.clone(),
        )
    }

    pub fn create_subscription_payment_handler(&self) -> CreateSubscriptionPaymentHandler {
        CreateSubscriptionPaymentHandler::new(
            self.cart_service.clone(),
            self.customer_service.clone(),
            self.variant_service.clone(),
            self.billing_provider.clone(),
            self.subscription_repository.clone(),
            self.event_publisher.clone(),
        )
    }
}

/// Assemble the complete API router.
///
/// # Mounts
/// - `/admin/subscriptions` - admin CRUD
/// - `/store` - customer portal and subscription payments
/// - `/hooks` - provider webhooks (raw body, signature-verified)
pub fn api_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest(
            "/admin/subscriptions",
            admin::admin_subscription_routes(),
        )
        .nest("/store", store::store_routes())
        .nest("/hooks", hooks::hooks_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
