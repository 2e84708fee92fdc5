//! Foundation value objects shared across the domain.

mod errors;
mod events;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope};
pub use ids::{
    CartId, CustomerId, EventId, LineItemId, OrderId, SubscriptionId, SubscriptionItemId,
    VariantId,
};
pub use timestamp::Timestamp;
