//! In-process event bus.
//!
//! Callbacks registered per event type are invoked in registration order
//! when a matching envelope is published. Subscriber failures are the
//! subscriber's responsibility; publishing never fails because of one.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::{EventPublisher, EventSubscriber, SubscriberCallback};

/// In-memory implementation of the event bus ports.
pub struct InMemoryEventBus {
    subscribers: RwLock<HashMap<String, Vec<SubscriberCallback>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let callbacks = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .get(&event.event_type)
                .cloned()
                .unwrap_or_default()
        };

        tracing::debug!(
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            subscribers = callbacks.len(),
            "publishing event"
        );

        for callback in callbacks {
            callback(event.clone()).await;
        }

        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for InMemoryEventBus {
    async fn subscribe(&self, event_type: &str, callback: SubscriberCallback) {
        let mut subscribers = self.subscribers.write().await;
        subscribers
            .entry(event_type.to_string())
            .or_default()
            .push(callback);
    }
}
