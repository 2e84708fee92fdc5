//! Stripe adapter: REST API client and wire types.

mod stripe_adapter;
mod webhook_types;

pub use stripe_adapter::{StripeBillingAdapter, StripeConfig};
pub use webhook_types::{
    Expandable, StripeCustomer, StripeList, StripePortalSession, StripePrice, StripeSubscription,
    StripeSubscriptionItem,
};
