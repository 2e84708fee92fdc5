//! Axum router for the admin subscription endpoints.

use axum::routing::get;
use axum::Router;

use super::super::AppState;
use super::handlers::{
    delete_subscription, get_subscription, list_subscriptions, update_subscription,
};

/// Create the admin subscriptions router.
///
/// # Routes
/// - `GET /` - list subscriptions (offset/limit paging)
/// - `GET /:id` - retrieve one subscription
/// - `POST /:id` - partial update
/// - `DELETE /:id` - soft delete (no-op when absent)
pub fn admin_subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subscriptions))
        .route(
            "/:id",
            get(get_subscription)
                .post(update_subscription)
                .delete(delete_subscription),
        )
}
