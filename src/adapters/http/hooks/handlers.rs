//! HTTP handler for the provider webhook endpoint.
//!
//! Verification happens before anything else: a request with a missing or
//! invalid signature never reaches the processor, so no downstream service
//! is invoked for unauthenticated payloads.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::ports::WebhookResult;

use super::super::AppState;

/// Header carrying the provider's signature.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /hooks - verify, deduplicate, and dispatch a webhook delivery.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("webhook request without signature header");
        return (StatusCode::BAD_REQUEST, "missing stripe-signature header").into_response();
    };

    let event = match state.webhook_verifier.verify_and_parse(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "webhook verification failed");
            return (e.status_code(), e.to_string()).into_response();
        }
    };

    let event_id = event.id.clone();
    let event_type = event.event_type.clone();

    match state.webhook_processor.process(event).await {
        Ok(WebhookResult::Processed) | Ok(WebhookResult::AlreadyProcessed) => {
            StatusCode::OK.into_response()
        }
        Ok(WebhookResult::Ignored) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::error!(
                event_id = %event_id,
                event_type = %event_type,
                error = %e,
                retryable = e.is_retryable(),
                "webhook processing failed"
            );
            (e.status_code(), e.to_string()).into_response()
        }
    }
}
