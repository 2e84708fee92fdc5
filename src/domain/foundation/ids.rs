//! Strongly-typed identifier value objects.
//!
//! Aggregate ids owned by this service (`SubscriptionId`,
//! `SubscriptionItemId`) are prefixed strings assigned exactly once at
//! construction. Ids owned by the wider platform or the billing provider
//! (carts, orders, customers, variants) are opaque non-empty strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for a subscription (`sub_...`).
///
/// Subscriptions created from a provider event keep the provider's own
/// `sub_...` identifier, so webhook lookups are plain primary-key lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    const PREFIX: &'static str = "sub_";

    /// Generates a new random SubscriptionId.
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4().simple()))
    }

    /// Parses an existing identifier, validating the prefix.
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        match s.strip_prefix(Self::PREFIX) {
            Some(rest) if !rest.is_empty() => Ok(Self(s)),
            _ => Err(ValidationError::invalid_format(
                "subscription_id",
                format!("expected '{}' prefix", Self::PREFIX),
            )),
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriptionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unique identifier for a subscription item (`subitem_...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionItemId(String);

impl SubscriptionItemId {
    const PREFIX: &'static str = "subitem_";

    /// Generates a new random SubscriptionItemId.
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::PREFIX, Uuid::new_v4().simple()))
    }

    /// Parses an existing identifier, validating the prefix.
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        match s.strip_prefix(Self::PREFIX) {
            Some(rest) if !rest.is_empty() => Ok(Self(s)),
            _ => Err(ValidationError::invalid_format(
                "subscription_item_id",
                format!("expected '{}' prefix", Self::PREFIX),
            )),
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriptionItemId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unique identifier for a domain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random EventId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! opaque_platform_id {
    ($(#[$doc:meta])* $name:ident, $field:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier, rejecting empty strings.
            pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
                let s = s.into();
                if s.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(s))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

opaque_platform_id!(
    /// Identifier of a cart owned by the core commerce platform.
    CartId,
    "cart_id"
);

opaque_platform_id!(
    /// Identifier of an order owned by the core commerce platform.
    OrderId,
    "order_id"
);

opaque_platform_id!(
    /// Identifier of a cart/order line item.
    LineItemId,
    "line_item_id"
);

opaque_platform_id!(
    /// Identifier of a platform customer.
    CustomerId,
    "customer_id"
);

opaque_platform_id!(
    /// Identifier of a product variant.
    VariantId,
    "variant_id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_subscription_id_has_prefix() {
        let id = SubscriptionId::generate();
        assert!(id.as_str().starts_with("sub_"));
    }

    #[test]
    fn generated_subscription_ids_are_unique() {
        let a = SubscriptionId::generate();
        let b = SubscriptionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_accepts_provider_subscription_id() {
        let id = SubscriptionId::parse("sub_1MowQVLkdIwHu7ixeRlqHVzs").unwrap();
        assert_eq!(id.as_str(), "sub_1MowQVLkdIwHu7ixeRlqHVzs");
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        assert!(SubscriptionId::parse("si_12345").is_err());
        assert!(SubscriptionId::parse("sub_").is_err());
        assert!(SubscriptionId::parse("").is_err());
    }

    #[test]
    fn item_id_has_prefix() {
        let id = SubscriptionItemId::generate();
        assert!(id.as_str().starts_with("subitem_"));
    }

    #[test]
    fn item_id_parse_rejects_foreign_prefix() {
        assert!(SubscriptionItemId::parse("sub_abc").is_err());
    }

    #[test]
    fn opaque_ids_reject_empty() {
        assert!(CartId::new("").is_err());
        assert!(CartId::new("cart_123").is_ok());
    }

    #[test]
    fn subscription_id_serde_is_transparent() {
        let id = SubscriptionId::parse("sub_abc123").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""sub_abc123""#);
        let back: SubscriptionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
