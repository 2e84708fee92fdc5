//! Subscription lifecycle events published on the event bus.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainEvent, EventEnvelope, EventId, SubscriptionId, Timestamp};

/// Event type name constants, shared with subscribers.
pub const SUBSCRIPTION_CREATED: &str = "subscription.created";
pub const SUBSCRIPTION_UPDATED: &str = "subscription.updated";
pub const SUBSCRIPTION_DELETED: &str = "subscription.deleted";

/// Lifecycle events for the Subscription aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SubscriptionEvent {
    Created {
        event_id: EventId,
        subscription_id: SubscriptionId,
        status: String,
        item_count: usize,
        occurred_at: Timestamp,
    },
    Updated {
        event_id: EventId,
        subscription_id: SubscriptionId,
        status: String,
        occurred_at: Timestamp,
    },
    Deleted {
        event_id: EventId,
        subscription_id: SubscriptionId,
        occurred_at: Timestamp,
    },
}

impl SubscriptionEvent {
    pub fn created(subscription_id: SubscriptionId, status: String, item_count: usize) -> Self {
        Self::Created {
            event_id: EventId::new(),
            subscription_id,
            status,
            item_count,
            occurred_at: Timestamp::now(),
        }
    }

    pub fn updated(subscription_id: SubscriptionId, status: String) -> Self {
        Self::Updated {
            event_id: EventId::new(),
            subscription_id,
            status,
            occurred_at: Timestamp::now(),
        }
    }

    pub fn deleted(subscription_id: SubscriptionId) -> Self {
        Self::Deleted {
            event_id: EventId::new(),
            subscription_id,
            occurred_at: Timestamp::now(),
        }
    }

    fn event_id(&self) -> EventId {
        match self {
            Self::Created { event_id, .. }
            | Self::Updated { event_id, .. }
            | Self::Deleted { event_id, .. } => *event_id,
        }
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            Self::Created { occurred_at, .. }
            | Self::Updated { occurred_at, .. }
            | Self::Deleted { occurred_at, .. } => *occurred_at,
        }
    }
}

impl DomainEvent for SubscriptionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => SUBSCRIPTION_CREATED,
            Self::Updated { .. } => SUBSCRIPTION_UPDATED,
            Self::Deleted { .. } => SUBSCRIPTION_DELETED,
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            Self::Created {
                subscription_id, ..
            }
            | Self::Updated {
                subscription_id, ..
            }
            | Self::Deleted {
                subscription_id, ..
            } => subscription_id.to_string(),
        }
    }

    fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope {
            event_id: self.event_id(),
            event_type: self.event_type().to_string(),
            aggregate_id: self.aggregate_id(),
            occurred_at: self.occurred_at(),
            payload: serde_json::to_value(self).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_event_has_expected_type() {
        let id = SubscriptionId::parse("sub_abc").unwrap();
        let event = SubscriptionEvent::created(id, "active".to_string(), 2);
        assert_eq!(event.event_type(), "subscription.created");
    }

    #[test]
    fn envelope_carries_aggregate_id() {
        let id = SubscriptionId::parse("sub_abc").unwrap();
        let envelope = SubscriptionEvent::deleted(id).to_envelope();
        assert_eq!(envelope.aggregate_id, "sub_abc");
        assert_eq!(envelope.event_type, "subscription.deleted");
    }

    #[test]
    fn updated_envelope_payload_includes_status() {
        let id = SubscriptionId::parse("sub_abc").unwrap();
        let envelope = SubscriptionEvent::updated(id, "past_due".to_string()).to_envelope();
        let payload = envelope.payload.to_string();
        assert!(payload.contains("past_due"));
    }
}
