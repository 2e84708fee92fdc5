//! HTTP handlers for the store endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::handlers::billing::{
    CreatePortalSessionCommand, CreateSubscriptionPaymentCommand,
};
use crate::domain::foundation::CartId;

use super::super::auth::AuthenticatedCustomer;
use super::super::error::ApiError;
use super::super::AppState;
use super::dto::{PortalSessionResponse, SubscriptionSessionResponse};

/// GET /store/customers/me/subscriptions/portal - billing portal access.
pub async fn get_subscription_portal(
    State(state): State<AppState>,
    customer: AuthenticatedCustomer,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_portal_session_handler();
    let session = handler
        .handle(CreatePortalSessionCommand {
            customer_id: customer.customer_id,
        })
        .await?;

    Ok(Json(PortalSessionResponse::from(session)))
}

/// POST /store/carts/:id/subscription-session - start a recurring payment.
pub async fn create_subscription_session(
    State(state): State<AppState>,
    _customer: AuthenticatedCustomer,
    Path(cart_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cart_id = CartId::new(cart_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let handler = state.create_subscription_payment_handler();
    let payment = handler
        .handle(CreateSubscriptionPaymentCommand { cart_id })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionSessionResponse::from(payment)),
    ))
}
