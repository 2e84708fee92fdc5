//! Webhook processor - Orchestrates idempotent webhook event handling.
//!
//! This module coordinates between verified Stripe events and the
//! event translator, ensuring each event is processed at most once.
//!
//! ## Design
//!
//! 1. Check if the event was already processed (idempotency, keyed by the
//!    provider's event id) before any state mutation
//! 2. Dispatch to the translator
//! 3. Record the processing result (success, ignored, or failed)
//!
//! ## Race Condition Handling
//!
//! When multiple deliveries of the same event arrive simultaneously:
//! - First to save wins (database PRIMARY KEY constraint)
//! - Others get `AlreadyExists` and report `AlreadyProcessed`

use async_trait::async_trait;
use std::sync::Arc;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult};

/// Dispatches a verified webhook event to domain operations.
///
/// Implementations branch on the closed event-type enum; every branch must
/// either fully succeed or leave local state unchanged.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// Handles the webhook event.
    ///
    /// Returns `Ok(())` on success.
    /// Returns `Err(WebhookError::Ignored(_))` if the event should be
    /// acknowledged but not processed.
    /// Returns other `Err` variants for actual failures.
    async fn dispatch(&self, event: &StripeEvent) -> Result<(), WebhookError>;
}

/// Processes webhook events with idempotency guarantees.
///
/// This is the main entry point for webhook processing. It coordinates
/// between the idempotency store and the dispatcher.
pub struct IdempotentWebhookProcessor {
    repository: Arc<dyn WebhookEventRepository>,
    dispatcher: Arc<dyn WebhookDispatcher>,
}

impl IdempotentWebhookProcessor {
    /// Creates a new processor with the given repository and dispatcher.
    pub fn new(
        repository: Arc<dyn WebhookEventRepository>,
        dispatcher: Arc<dyn WebhookDispatcher>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
        }
    }

    /// Process a webhook event at most once.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed)` - Event was processed successfully
    /// - `Ok(WebhookResult::AlreadyProcessed)` - Duplicate delivery, skipped
    /// - `Ok(WebhookResult::Ignored)` - Unknown/unsupported type, recorded
    /// - `Err(_)` - Processing failed; the failure is recorded so redelivery
    ///   behavior stays observable
    pub async fn process(&self, event: StripeEvent) -> Result<WebhookResult, WebhookError> {
        if let Some(existing) = self.repository.find_by_event_id(&event.id).await? {
            // Failed deliveries stay retryable; the provider's redelivery
            // is the only retry mechanism there is.
            if existing.result != "failed" {
                tracing::debug!(event_id = %event.id, "duplicate webhook delivery skipped");
                return Ok(WebhookResult::AlreadyProcessed);
            }
            tracing::info!(event_id = %event.id, "reprocessing previously failed webhook event");
        }

        let result = self.dispatcher.dispatch(&event).await;

        let payload = serde_json::to_value(&event)
            .map_err(|e| WebhookError::ParseError(format!("failed to serialize event: {}", e)))?;

        let record = match &result {
            Ok(()) => WebhookEventRecord::success(&event.id, &event.event_type, payload),
            Err(WebhookError::Ignored(reason)) => {
                WebhookEventRecord::ignored(&event.id, &event.event_type, reason, payload)
            }
            Err(e) => {
                WebhookEventRecord::failed(&event.id, &event.event_type, e.to_string(), payload)
            }
        };

        match self.repository.save(record).await? {
            SaveResult::Inserted => match result {
                Ok(()) => Ok(WebhookResult::Processed),
                Err(WebhookError::Ignored(reason)) => {
                    tracing::info!(event_id = %event.id, event_type = %event.event_type, %reason, "webhook event ignored");
                    Ok(WebhookResult::Ignored)
                }
                Err(e) => Err(e),
            },
            SaveResult::AlreadyExists => {
                // Lost the race, another delivery already handled it
                Ok(WebhookResult::AlreadyProcessed)
            }
        }
    }
}
