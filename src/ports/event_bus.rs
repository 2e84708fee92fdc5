//! Event bus ports - publishing and subscribing to domain events.
//!
//! The bus is in-process; subscribers register callbacks per event type
//! and publishers fan envelopes out to every registered callback.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Callback invoked with each matching event envelope.
pub type SubscriberCallback =
    Arc<dyn Fn(EventEnvelope) -> BoxFuture<'static, ()> + Send + Sync>;

/// Port for publishing domain events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publishes a batch of events in order.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

/// Port for registering event subscribers.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Registers a callback for the given event type.
    async fn subscribe(&self, event_type: &str, callback: SubscriberCallback);
}
