//! Subscription aggregate and lifecycle events.

mod aggregate;
mod errors;
mod events;

pub use aggregate::{NewSubscriptionItem, Subscription, SubscriptionItem};
pub use errors::SubscriptionError;
pub use events::{
    SubscriptionEvent, SUBSCRIPTION_CREATED, SUBSCRIPTION_DELETED, SUBSCRIPTION_UPDATED,
};
