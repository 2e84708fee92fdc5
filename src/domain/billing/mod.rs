//! Billing provider webhook handling: event model, signature verification,
//! and the idempotent processor.

mod stripe_event;
mod webhook_errors;
mod webhook_processor;
mod webhook_verifier;

pub use stripe_event::{
    InvoicePayload, PaymentIntentPayload, StripeEvent, StripeEventData, StripeEventType,
    SubscriptionPayload,
};
pub use webhook_errors::WebhookError;
pub use webhook_processor::{IdempotentWebhookProcessor, WebhookDispatcher};
pub use webhook_verifier::{hex_encode, SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
