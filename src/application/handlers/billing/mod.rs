//! Billing handlers: portal sessions, subscription payments, and the
//! webhook event translator.

mod create_portal_session;
mod create_subscription_payment;
mod webhook_translator;

#[cfg(test)]
pub(crate) mod test_support;

pub use create_portal_session::{CreatePortalSessionCommand, CreatePortalSessionHandler};
pub use create_subscription_payment::{
    CreateSubscriptionPaymentCommand, CreateSubscriptionPaymentHandler, SubscriptionPayment,
};
pub use webhook_translator::BillingEventTranslator;
