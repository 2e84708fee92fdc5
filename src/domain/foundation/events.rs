//! Domain event envelope shared by all aggregates.
//!
//! Events are published on the in-process event bus so subscribers
//! (provider catalog sync, audit logging) can react to lifecycle changes.

use serde::{Deserialize, Serialize};

use super::{EventId, Timestamp};

/// Serialized domain event ready for the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique id of this event instance.
    pub event_id: EventId,

    /// Dotted event type name, e.g. "subscription.created".
    pub event_type: String,

    /// Identifier of the aggregate the event concerns.
    pub aggregate_id: String,

    /// When the event occurred.
    pub occurred_at: Timestamp,

    /// Event-specific payload.
    pub payload: serde_json::Value,
}

/// Implemented by domain events that can be published on the bus.
pub trait DomainEvent {
    /// Dotted event type name.
    fn event_type(&self) -> &'static str;

    /// Identifier of the aggregate the event concerns.
    fn aggregate_id(&self) -> String;

    /// Serializes the event into an envelope.
    fn to_envelope(&self) -> EventEnvelope;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_roundtrip() {
        let envelope = EventEnvelope {
            event_id: EventId::new(),
            event_type: "subscription.created".to_string(),
            aggregate_id: "sub_123".to_string(),
            occurred_at: Timestamp::from_unix(1704067200),
            payload: serde_json::json!({"id": "sub_123"}),
        };

        let json = serde_json::to_string(&envelope).unwrap();
        let back: EventEnvelope = serde_json::from_str(&json).unwrap();

        assert_eq!(back.event_type, "subscription.created");
        assert_eq!(back.aggregate_id, "sub_123");
        assert_eq!(back.occurred_at, envelope.occurred_at);
    }
}
