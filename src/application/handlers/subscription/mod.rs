//! Subscription command/query handlers.

mod create_subscription;
mod delete_subscription;
mod get_subscription;
mod list_subscriptions;
mod update_subscription;

#[cfg(test)]
pub(crate) mod test_support;

pub use create_subscription::{CreateSubscriptionCommand, CreateSubscriptionHandler};
pub use delete_subscription::{DeleteSubscriptionCommand, DeleteSubscriptionHandler};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery};
pub use list_subscriptions::{
    ListSubscriptionsHandler, ListSubscriptionsQuery, SubscriptionPage,
};
pub use update_subscription::{
    UpdateSubscriptionCommand, UpdateSubscriptionHandler, UpdateSubscriptionPatch,
};
