//! CartService port - view and mutations of platform-owned carts.
//!
//! Carts, line items, and payment sessions belong to the core commerce
//! platform; this port exposes only the operations the billing extension
//! needs (subscription linking and the webhook payment flow).

use async_trait::async_trait;

use crate::domain::foundation::{
    CartId, CustomerId, DomainError, LineItemId, SubscriptionId, SubscriptionItemId, VariantId,
};

/// Read model of a cart with the fields this service touches.
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: CartId,
    pub customer_id: Option<CustomerId>,
    pub email: Option<String>,
    pub currency_code: String,
    pub subscription_id: Option<SubscriptionId>,
    /// Provider invoice id set when the subscription payment was created.
    pub external_id: Option<String>,
    /// Provider id of the currently selected payment session, if any.
    pub selected_payment_provider: Option<String>,
    pub items: Vec<CartLineItem>,
}

/// A priced line within a cart.
#[derive(Debug, Clone)]
pub struct CartLineItem {
    pub id: LineItemId,
    pub variant_id: VariantId,
    pub title: String,
    pub quantity: i32,
    pub subscription_item_id: Option<SubscriptionItemId>,
}

/// Port over the platform's cart service.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Loads a cart with its line items.
    async fn retrieve(&self, id: &CartId) -> Result<Option<Cart>, DomainError>;

    /// Links a cart to a subscription and records the provider invoice id.
    async fn link_subscription(
        &self,
        id: &CartId,
        subscription_id: &SubscriptionId,
        external_id: &str,
    ) -> Result<(), DomainError>;

    /// Links a cart line item to a subscription item.
    async fn link_line_item(
        &self,
        line_item_id: &LineItemId,
        subscription_item_id: &SubscriptionItemId,
    ) -> Result<(), DomainError>;

    /// Selects the payment session for the given provider on the cart.
    async fn set_payment_session(
        &self,
        id: &CartId,
        provider_id: &str,
    ) -> Result<(), DomainError>;

    /// Authorizes the selected payment session.
    async fn authorize_payment(&self, id: &CartId) -> Result<(), DomainError>;
}
