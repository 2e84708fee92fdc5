//! Stripe webhook event types.
//!
//! The event envelope plus the closed set of event kinds this service
//! reacts to. `data.object` is kept as raw JSON and deserialized per
//! branch into the typed payload views below; the `object` field inside
//! it discriminates payment intents, subscriptions, and invoices.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::webhook_errors::WebhookError;

/// Stripe webhook event (simplified).
///
/// Contains the essential fields needed for webhook processing.
/// Additional fields from Stripe's full event schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "invoice.paid").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    pub livemode: bool,

    /// API version used to render this event.
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,

    /// Previous values for updated attributes (only for update events).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::from_event_name(&self.event_type)
    }

    /// Attempts to deserialize the data object as the specified type.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` when the payload does not match
    /// the expected shape, so a recognized event with a malformed object
    /// fails safely before any state mutation.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(&self) -> Result<T, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("invalid data.object: {}", e)))
    }
}

/// Known Stripe event types that the dispatcher handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StripeEventType {
    /// A PaymentIntent completed payment.
    PaymentIntentSucceeded,
    /// A PaymentIntent was canceled.
    PaymentIntentCanceled,
    /// A PaymentIntent payment attempt failed.
    PaymentIntentPaymentFailed,
    /// Funds became capturable on a PaymentIntent.
    PaymentIntentAmountCapturableUpdated,
    /// A PaymentIntent was created.
    PaymentIntentCreated,
    /// A customer was created on the provider.
    CustomerCreated,
    /// A provider subscription was created.
    SubscriptionCreated,
    /// A provider subscription changed (status, plan, coupon, ...).
    SubscriptionUpdated,
    /// A provider subscription ended.
    SubscriptionDeleted,
    /// An invoice was paid.
    InvoicePaid,
    /// An invoice was finalized.
    InvoiceFinalized,
    /// An invoice payment requires customer authentication.
    InvoicePaymentActionRequired,
    /// An invoice payment failed.
    InvoicePaymentFailed,
    /// An invoice is upcoming.
    InvoiceUpcoming,
    /// An invoice was created.
    InvoiceCreated,
    /// An invoice could not be finalized.
    InvoiceFinalizationFailed,
    /// Unknown or unhandled event type.
    Unknown,
}

impl StripeEventType {
    /// Parse event type from the provider's event name.
    pub fn from_event_name(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.canceled" => Self::PaymentIntentCanceled,
            "payment_intent.payment_failed" => Self::PaymentIntentPaymentFailed,
            "payment_intent.amount_capturable_updated" => {
                Self::PaymentIntentAmountCapturableUpdated
            }
            "payment_intent.created" => Self::PaymentIntentCreated,
            "customer.created" => Self::CustomerCreated,
            "customer.subscription.created" => Self::SubscriptionCreated,
            "customer.subscription.updated" => Self::SubscriptionUpdated,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            "invoice.paid" => Self::InvoicePaid,
            "invoice.finalized" => Self::InvoiceFinalized,
            "invoice.payment_action_required" => Self::InvoicePaymentActionRequired,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            "invoice.upcoming" => Self::InvoiceUpcoming,
            "invoice.created" => Self::InvoiceCreated,
            "invoice.finalization_failed" => Self::InvoiceFinalizationFailed,
            _ => Self::Unknown,
        }
    }

    /// Convert to the provider's event name.
    pub fn as_event_name(&self) -> &'static str {
        match self {
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::PaymentIntentCanceled => "payment_intent.canceled",
            Self::PaymentIntentPaymentFailed => "payment_intent.payment_failed",
            Self::PaymentIntentAmountCapturableUpdated => {
                "payment_intent.amount_capturable_updated"
            }
            Self::PaymentIntentCreated => "payment_intent.created",
            Self::CustomerCreated => "customer.created",
            Self::SubscriptionCreated => "customer.subscription.created",
            Self::SubscriptionUpdated => "customer.subscription.updated",
            Self::SubscriptionDeleted => "customer.subscription.deleted",
            Self::InvoicePaid => "invoice.paid",
            Self::InvoiceFinalized => "invoice.finalized",
            Self::InvoicePaymentActionRequired => "invoice.payment_action_required",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::InvoiceUpcoming => "invoice.upcoming",
            Self::InvoiceCreated => "invoice.created",
            Self::InvoiceFinalizationFailed => "invoice.finalization_failed",
            Self::Unknown => "unknown",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Typed payload views (data.object)
// ════════════════════════════════════════════════════════════════════════════════

/// `data.object` for `payment_intent.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentPayload {
    /// Payment intent id (pi_...).
    pub id: String,

    /// Object discriminator, always "payment_intent".
    pub object: String,

    /// Intent status.
    pub status: Option<String>,

    /// Metadata stamped at payment creation; carries `cart_id`.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentPayload {
    /// Returns the cart id stamped into the intent metadata.
    pub fn cart_id(&self) -> Result<&str, WebhookError> {
        self.metadata
            .get("cart_id")
            .map(String::as_str)
            .ok_or(WebhookError::MissingMetadata("cart_id"))
    }
}

/// `data.object` for `customer.subscription.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionPayload {
    /// Subscription id (sub_...).
    pub id: String,

    /// Object discriminator, always "subscription".
    pub object: String,

    /// Owning customer id (cus_...).
    pub customer: Option<String>,

    /// Provider status string.
    pub status: String,

    /// End of the current billing period (Unix timestamp).
    pub current_period_end: Option<i64>,
}

/// `data.object` for `invoice.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicePayload {
    /// Invoice id (in_...).
    pub id: String,

    /// Object discriminator, always "invoice".
    pub object: String,

    /// Subscription the invoice bills, if any.
    pub subscription: Option<String>,

    /// Metadata stamped at payment creation; carries `cart_id`.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl InvoicePayload {
    /// Returns the cart id stamped into the invoice metadata.
    pub fn cart_id(&self) -> Result<&str, WebhookError> {
        self.metadata
            .get("cart_id")
            .map(String::as_str)
            .ok_or(WebhookError::MissingMetadata("cart_id"))
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new(event_type: &str) -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: event_type.to_string(),
            created: 1704067200,
            object: serde_json::json!({}),
            livemode: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: self.livemode,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}
