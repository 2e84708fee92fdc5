//! CreateSubscriptionHandler - persists a subscription with its items.

use std::sync::Arc;

use crate::domain::foundation::{DomainEvent, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    NewSubscriptionItem, Subscription, SubscriptionError, SubscriptionEvent,
};
use crate::ports::{EventPublisher, SubscriptionRepository};

/// Command to create a subscription.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    /// Provider-assigned id; a local id is generated when absent.
    pub id: Option<SubscriptionId>,
    /// Provider status string, stored verbatim.
    pub status: String,
    pub next_payment_at: Option<Timestamp>,
    pub metadata: Option<serde_json::Value>,
    pub items: Vec<NewSubscriptionItem>,
}

/// Handler for creating subscriptions.
pub struct CreateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<Subscription, SubscriptionError> {
        let subscription = Subscription::create(
            cmd.id,
            cmd.status,
            cmd.next_payment_at,
            cmd.metadata,
            cmd.items,
        )?;

        self.repository.create(&subscription).await?;

        let event = SubscriptionEvent::created(
            subscription.id.clone(),
            subscription.status.clone(),
            subscription.items.len(),
        );
        self.event_publisher.publish(event.to_envelope()).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            items = subscription.items.len(),
            "subscription created"
        );

        Ok(subscription)
    }
}
