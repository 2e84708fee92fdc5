//! Axum router for the store endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::super::AppState;
use super::handlers::{create_subscription_session, get_subscription_portal};

/// Create the store router.
///
/// # Routes
/// - `GET /customers/me/subscriptions/portal` - billing portal session
/// - `POST /carts/:id/subscription-session` - start a recurring payment
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/customers/me/subscriptions/portal",
            get(get_subscription_portal),
        )
        .route(
            "/carts/:id/subscription-session",
            post(create_subscription_session),
        )
}
