//! OrderService port - operations on platform-owned orders.

use async_trait::async_trait;

use crate::domain::foundation::{CartId, DomainError, OrderId};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
        }
    }
}

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    NotPaid,
    Awaiting,
    Authorized,
    Captured,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::NotPaid => "not_paid",
            PaymentStatus::Awaiting => "awaiting",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Captured => "captured",
        }
    }
}

/// Read model of an order with the fields this service touches.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub cart_id: CartId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Provider invoice id, when the order originated from an invoice event.
    pub external_id: Option<String>,
}

/// Port over the platform's order service.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Finds the order created from a cart, if any.
    async fn retrieve_by_cart_id(&self, cart_id: &CartId) -> Result<Option<Order>, DomainError>;

    /// Creates an order from an authorized cart.
    async fn create_from_cart(&self, cart_id: &CartId) -> Result<Order, DomainError>;

    /// Captures the order's authorized payment.
    async fn capture_payment(&self, id: &OrderId) -> Result<(), DomainError>;

    /// Updates the order's lifecycle status.
    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), DomainError>;

    /// Records a provider-side reference on the order.
    async fn set_external_id(&self, id: &OrderId, external_id: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_service_is_object_safe() {
        fn _accepts_dyn(_service: &dyn OrderService) {}
    }

    #[test]
    fn status_strings_are_stable() {
        assert_eq!(OrderStatus::Canceled.as_str(), "canceled");
        assert_eq!(PaymentStatus::Captured.as_str(), "captured");
    }
}
