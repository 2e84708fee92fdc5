//! UpdateSubscriptionHandler - partial update from the admin API.

use std::sync::Arc;

use crate::domain::foundation::{DomainEvent, SubscriptionId, Timestamp};
use crate::domain::subscription::{Subscription, SubscriptionError, SubscriptionEvent};
use crate::ports::{EventPublisher, SubscriptionRepository};

/// Command with the fields to change; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateSubscriptionPatch {
    pub status: Option<String>,
    pub next_payment_at: Option<Timestamp>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct UpdateSubscriptionCommand {
    pub id: SubscriptionId,
    pub patch: UpdateSubscriptionPatch,
}

pub struct UpdateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl UpdateSubscriptionHandler {
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
        cmd: UpdateSubscriptionCommand,
    ) -> Result<Subscription, SubscriptionError> {
        let mut subscription = self
            .repository
            .find_by_id(&cmd.id)
            .await?
            .ok_or_else(|| SubscriptionError::NotFound(cmd.id.to_string()))?;

        apply_patch(&mut subscription, cmd.patch);

        self.repository.update(&subscription).await?;

        let event =
            SubscriptionEvent::updated(subscription.id.clone(), subscription.status.clone());
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(subscription)
    }
}

fn apply_patch(subscription: &mut Subscription, patch: UpdateSubscriptionPatch) {
    if let Some(status) = patch.status {
        subscription.update_status(status);
    }
    if let Some(next_payment_at) = patch.next_payment_at {
        subscription.update_next_payment_at(Some(next_payment_at));
    }
    if let Some(metadata) = patch.metadata {
        subscription.update_metadata(Some(metadata));
    }
}
