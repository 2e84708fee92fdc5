//! Billing provider port for the external recurring-billing gateway.
//!
//! Defines the contract for the payment gateway integration (Stripe).
//! Implementations handle customer management, subscription creation,
//! catalog mirroring, and billing portal sessions.
//!
//! # Design
//!
//! - **Gateway agnostic**: interface works with any recurring-billing provider
//! - **Idempotent**: operations can be safely retried

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CustomerId, DomainError, ErrorCode, VariantId};
use crate::ports::variant_service::ProductVariant;

/// Port for the external billing provider.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a customer in the provider's system.
    ///
    /// Returns the provider's customer record for future reference.
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<ProviderCustomer, BillingError>;

    /// Get a customer by provider id; `None` if absent or deleted.
    async fn retrieve_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<ProviderCustomer>, BillingError>;

    /// Create a provider subscription with its first (incomplete) invoice.
    async fn create_subscription(
        &self,
        request: CreateProviderSubscriptionRequest,
    ) -> Result<ProviderSubscription, BillingError>;

    /// Get a subscription by provider id; `None` if absent.
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderSubscription>, BillingError>;

    /// Cancel a provider subscription immediately.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, BillingError>;

    /// Create a billing portal session for subscription self-management.
    ///
    /// Returns a URL for the customer to manage their subscription.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError>;

    /// Stamp a key/value pair into an invoice's metadata.
    async fn update_invoice_metadata(
        &self,
        invoice_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BillingError>;

    /// Find an active recurring price for a catalog product in a currency.
    async fn find_price_for_product(
        &self,
        product_id: &str,
        currency: &str,
    ) -> Result<Option<ProviderPrice>, BillingError>;

    /// Mirror a subscription product variant into the provider catalog.
    async fn create_product(&self, variant: &ProductVariant) -> Result<(), BillingError>;

    /// Update a mirrored catalog product.
    async fn update_product(&self, variant: &ProductVariant) -> Result<(), BillingError>;

    /// Remove a mirrored catalog product.
    async fn delete_product(&self, variant_id: &VariantId) -> Result<(), BillingError>;
}

/// Request to create a provider customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Platform customer id (stored as metadata), if known.
    pub customer_id: Option<CustomerId>,

    /// Customer email address.
    pub email: String,

    /// Customer name (optional).
    pub name: Option<String>,
}

/// Customer in the provider's system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCustomer {
    /// Provider's customer id (cus_...).
    pub id: String,

    /// Customer email.
    pub email: Option<String>,

    /// Customer name.
    pub name: Option<String>,

    /// When the customer was created (provider timestamp).
    pub created_at: i64,
}

/// Request to create a provider subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderSubscriptionRequest {
    /// Provider's customer id.
    pub customer_id: String,

    /// One price id per cart line.
    pub price_ids: Vec<String>,

    /// Cart id stamped into subscription metadata for webhook correlation.
    pub cart_id: String,
}

/// Subscription in the provider's system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSubscription {
    /// Provider's subscription id (sub_...).
    pub id: String,

    /// Provider's customer id.
    pub customer_id: String,

    /// Provider status string (active, incomplete, past_due, ...).
    pub status: String,

    /// Id of the latest invoice, when expanded.
    pub latest_invoice_id: Option<String>,

    /// End of the current billing period (Unix timestamp).
    pub current_period_end: Option<i64>,

    /// Subscription lines.
    pub lines: Vec<ProviderSubscriptionLine>,
}

/// One line of a provider subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSubscriptionLine {
    /// Provider's line id (si_...).
    pub id: String,

    /// Price the line bills.
    pub price_id: String,

    /// Billing interval of the price (e.g. "month"), if known.
    pub period: Option<String>,
}

/// Billing portal session for subscription self-management.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSession {
    /// Provider's session id.
    pub id: String,

    /// URL for the customer to access the portal.
    pub url: String,
}

/// A recurring price in the provider catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPrice {
    /// Provider's price id (price_...).
    pub id: String,

    /// ISO currency code.
    pub currency: String,

    /// Billing interval (e.g. "month"), if recurring.
    pub interval: Option<String>,
}

/// Errors from billing provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingError {
    /// Error code for categorization.
    pub code: BillingErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl BillingError {
    /// Create a new billing error.
    pub fn new(code: BillingErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BillingErrorCode::NetworkError, message)
    }

    /// Create a provider API error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(BillingErrorCode::ProviderError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(BillingErrorCode::NotFound, format!("{} not found", resource))
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for BillingError {}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        let code = match err.code {
            BillingErrorCode::CardDeclined => ErrorCode::PaymentRequired,
            BillingErrorCode::NotFound => ErrorCode::ExternalServiceError,
            _ => ErrorCode::ExternalServiceError,
        };
        DomainError::new(code, err.message)
    }
}

/// Billing error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Card was declined.
    CardDeclined,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl BillingErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingErrorCode::NetworkError | BillingErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for BillingErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BillingErrorCode::NetworkError => "network_error",
            BillingErrorCode::AuthenticationError => "authentication_error",
            BillingErrorCode::CardDeclined => "card_declined",
            BillingErrorCode::NotFound => "not_found",
            BillingErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            BillingErrorCode::ProviderError => "provider_error",
            BillingErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn BillingProvider) {}
    }

    #[test]
    fn billing_error_retryable() {
        assert!(BillingErrorCode::NetworkError.is_retryable());
        assert!(BillingErrorCode::RateLimitExceeded.is_retryable());

        assert!(!BillingErrorCode::CardDeclined.is_retryable());
        assert!(!BillingErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn billing_error_display() {
        let err = BillingError::provider("boom");
        assert!(err.to_string().contains("provider_error"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn billing_error_converts_to_domain_error() {
        let err: DomainError = BillingError::not_found("subscription").into();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }
}
