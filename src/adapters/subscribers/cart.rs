//! Cart subscriber - keeps provider-side payment state in step with cart
//! changes.
//!
//! When a cart that already carries a subscription payment changes its
//! customer, the invoice created for it is re-stamped so webhook
//! correlation keeps working.

use futures::FutureExt;
use std::sync::Arc;

use crate::domain::foundation::CartId;
use crate::ports::{BillingProvider, CartService, EventSubscriber};

pub const CART_CUSTOMER_UPDATED: &str = "cart.customer_updated";

/// Registers cart-sync callbacks on the event bus.
pub struct CartSubscriber {
    cart_service: Arc<dyn CartService>,
    billing_provider: Arc<dyn BillingProvider>,
}

impl CartSubscriber {
    pub fn new(
        cart_service: Arc<dyn CartService>,
        billing_provider: Arc<dyn BillingProvider>,
    ) -> Self {
        Self {
            cart_service,
            billing_provider,
        }
    }

    /// Attaches this subscriber's callbacks to the bus.
    pub async fn attach(self: Arc<Self>, bus: &dyn EventSubscriber) {
        let subscriber = self.clone();
        bus.subscribe(
            CART_CUSTOMER_UPDATED,
            Arc::new(move |event| {
                let subscriber = subscriber.clone();
                async move {
                    subscriber.on_customer_updated(&event.aggregate_id).await;
                }
                .boxed()
            }),
        )
        .await;
    }

    async fn on_customer_updated(&self, cart_id: &str) {
        let Ok(id) = CartId::new(cart_id) else {
            return;
        };

        let cart = match self.cart_service.retrieve(&id).await {
            Ok(Some(cart)) => cart,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(%cart_id, error = %e, "failed to load cart");
                return;
            }
        };

        // Only carts already carrying a subscription payment are relevant.
        if cart.subscription_id.is_none() {
            return;
        }
        let Some(invoice_id) = cart.external_id else {
            return;
        };

        if let Err(e) = self
            .billing_provider
            .update_invoice_metadata(&invoice_id, "cart_id", cart.id.as_str())
            .await
        {
            tracing::error!(%cart_id, %invoice_id, error = %e, "failed to refresh invoice metadata");
        }
    }
}
