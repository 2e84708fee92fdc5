//! VariantService port - read access to product variants.
//!
//! Variants flagged `is_subscription` are mirrored into the billing
//! provider's catalog by the product-variant subscriber.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, VariantId};

/// Read model of a product variant with the subscription flags.
#[derive(Debug, Clone)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: String,
    pub title: String,
    pub is_subscription: bool,
    pub is_digital: bool,
    /// Billing period for subscription variants (provider vocabulary).
    pub subscription_period: Option<String>,
}

/// Port over the platform's product variant service.
#[async_trait]
pub trait VariantService: Send + Sync {
    /// Loads a variant by id.
    async fn retrieve(&self, id: &VariantId) -> Result<Option<ProductVariant>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_service_is_object_safe() {
        fn _accepts_dyn(_service: &dyn VariantService) {}
    }
}
