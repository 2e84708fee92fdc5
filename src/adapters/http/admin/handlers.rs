//! HTTP handlers for the admin subscription endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::handlers::subscription::{
    DeleteSubscriptionCommand, GetSubscriptionQuery, ListSubscriptionsQuery,
    UpdateSubscriptionCommand, UpdateSubscriptionPatch,
};
use crate::domain::foundation::{SubscriptionId, Timestamp};

use super::super::auth::AuthenticatedAdmin;
use super::super::error::ApiError;
use super::super::AppState;
use super::dto::{
    DeleteSubscriptionResponse, ListSubscriptionsParams, ListSubscriptionsResponse,
    SubscriptionEnvelope, SubscriptionResponse, UpdateSubscriptionRequest,
};

fn parse_id(raw: &str) -> Result<SubscriptionId, ApiError> {
    SubscriptionId::parse(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// GET /admin/subscriptions - list subscriptions, newest first.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(params): Query<ListSubscriptionsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.list_subscriptions_handler();
    let page = handler
        .handle(ListSubscriptionsQuery {
            offset: params.offset,
            limit: params.limit,
        })
        .await?;

    Ok(Json(ListSubscriptionsResponse::from(page)))
}

/// GET /admin/subscriptions/:id - retrieve one subscription.
pub async fn get_subscription(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let handler = state.get_subscription_handler();
    let subscription = handler.handle(GetSubscriptionQuery { id }).await?;

    Ok(Json(SubscriptionEnvelope {
        subscription: SubscriptionResponse::from(subscription),
    }))
}

/// POST /admin/subscriptions/:id - partial update.
pub async fn update_subscription(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<UpdateSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let handler = state.update_subscription_handler();
    let subscription = handler
        .handle(UpdateSubscriptionCommand {
            id,
            patch: UpdateSubscriptionPatch {
                status: request.status,
                next_payment_at: request.next_payment_at.map(Timestamp::from_datetime),
                metadata: request.metadata,
            },
        })
        .await?;

    Ok(Json(SubscriptionEnvelope {
        subscription: SubscriptionResponse::from(subscription),
    }))
}

/// DELETE /admin/subscriptions/:id - soft delete.
///
/// Deleting a missing subscription still answers with the deletion
/// envelope; the operation is a no-op server-side.
pub async fn delete_subscription(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let handler = state.delete_subscription_handler();
    handler
        .handle(DeleteSubscriptionCommand { id: id.clone() })
        .await?;

    Ok((
        StatusCode::OK,
        Json(DeleteSubscriptionResponse::new(id.to_string())),
    ))
}
