//! Axum router for the webhook endpoint.
//!
//! Separate from the admin/store routers because webhook requests carry no
//! user authentication; they are authenticated by signature instead.

use axum::routing::post;
use axum::Router;

use super::super::AppState;
use super::handlers::handle_stripe_webhook;

/// Create the webhook router.
///
/// # Routes
/// - `POST /` - raw-body provider webhook (mounted at `/hooks`)
pub fn hooks_routes() -> Router<AppState> {
    Router::new().route("/", post(handle_stripe_webhook))
}
