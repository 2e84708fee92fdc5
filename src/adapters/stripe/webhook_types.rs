//! Stripe-specific wire types for the REST API client.
//!
//! These types represent Stripe API objects as returned by the API.
//! Only the fields this adapter reads are captured.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stripe Customer object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCustomer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    /// Customer email address.
    pub email: Option<String>,

    /// Customer name.
    pub name: Option<String>,

    /// Unix timestamp of creation.
    #[serde(default)]
    pub created: i64,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Whether the customer has been deleted.
    #[serde(default)]
    pub deleted: bool,
}

/// A resource reference that may arrive expanded or as a bare id.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Expandable {
    /// Bare id string.
    Id(String),
    /// Expanded object; only the id is read.
    Object { id: String },
}

impl Expandable {
    /// Returns the referenced id either way.
    pub fn id(&self) -> &str {
        match self {
            Expandable::Id(id) => id,
            Expandable::Object { id } => id,
        }
    }
}

/// Stripe Subscription object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscription {
    /// Unique subscription identifier (sub_...).
    pub id: String,

    /// Owning customer id (cus_...).
    pub customer: Expandable,

    /// Subscription status.
    pub status: String,

    /// Latest invoice, expanded or as id.
    pub latest_invoice: Option<Expandable>,

    /// Current period end (Unix timestamp).
    pub current_period_end: Option<i64>,

    /// Subscription items list.
    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,
}

/// Stripe list envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

/// One item of a Stripe subscription.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscriptionItem {
    /// Unique item identifier (si_...).
    pub id: String,

    /// Price the item bills.
    pub price: StripePrice,
}

/// Stripe Price object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePrice {
    /// Unique price identifier (price_...).
    pub id: String,

    /// ISO currency code.
    pub currency: String,

    /// Recurrence details; absent for one-time prices.
    pub recurring: Option<StripeRecurrence>,
}

/// Recurrence of a Stripe price.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeRecurrence {
    /// Billing interval (day, week, month, year).
    pub interval: String,
}

/// Stripe Billing Portal session object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePortalSession {
    /// Unique session identifier (bps_...).
    pub id: String,

    /// URL the customer should be redirected to.
    pub url: String,
}

/// Stripe error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

/// Stripe error body.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}
