//! Subscription subscriber - audit logging of subscription lifecycle events.

use futures::FutureExt;
use std::sync::Arc;

use crate::domain::subscription::{
    SUBSCRIPTION_CREATED, SUBSCRIPTION_DELETED, SUBSCRIPTION_UPDATED,
};
use crate::ports::EventSubscriber;

/// Registers audit-log callbacks for subscription lifecycle events.
pub struct SubscriptionSubscriber;

impl SubscriptionSubscriber {
    /// Attaches this subscriber's callbacks to the bus.
    pub async fn attach(bus: &dyn EventSubscriber) {
        for event_type in [
            SUBSCRIPTION_CREATED,
            SUBSCRIPTION_UPDATED,
            SUBSCRIPTION_DELETED,
        ] {
            bus.subscribe(
                event_type,
                Arc::new(move |event| {
                    async move {
                        tracing::info!(
                            event_type = %event.event_type,
                            subscription_id = %event.aggregate_id,
                            "subscription lifecycle event"
                        );
                    }
                    .boxed()
                }),
            )
            .await;
        }
    }
}
