//! BillingEventTranslator - maps provider webhook events onto local
//! cart/order/subscription state.
//!
//! This is the dispatcher plugged into the idempotent webhook processor.
//! Each branch is a finite sequence of operations against the commerce
//! ports; a branch either fully succeeds or returns an error without
//! having left partial local mutations behind (the order-creation path
//! performs its writes in dependency order, so an early failure aborts
//! the sequence before any dependent write).

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::billing::{
    InvoicePayload, PaymentIntentPayload, StripeEvent, StripeEventType, SubscriptionPayload,
    WebhookDispatcher, WebhookError,
};
use crate::domain::foundation::{CartId, DomainEvent, SubscriptionId, Timestamp};
use crate::domain::subscription::SubscriptionEvent;
use crate::ports::{
    CartService, DeleteOutcome, EventPublisher, Order, OrderService, OrderStatus, PaymentStatus,
    SubscriptionRepository,
};

/// Payment session provider id for one-off card payments.
const PROVIDER_STRIPE: &str = "stripe";

/// Payment session provider id for recurring subscription payments.
const PROVIDER_STRIPE_SUBSCRIPTION: &str = "stripe-subscription";

/// Translates verified provider events into commerce operations.
pub struct BillingEventTranslator {
    cart_service: Arc<dyn CartService>,
    order_service: Arc<dyn OrderService>,
    subscription_repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl BillingEventTranslator {
    pub fn new(
        cart_service: Arc<dyn CartService>,
        order_service: Arc<dyn OrderService>,
        subscription_repository: Arc<dyn SubscriptionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            cart_service,
            order_service,
            subscription_repository,
            event_publisher,
        }
    }

    fn parse_cart_id(raw: &str) -> Result<CartId, WebhookError> {
        CartId::new(raw).map_err(|_| WebhookError::MissingMetadata("cart_id"))
    }

    fn parse_subscription_id(raw: &str) -> Result<SubscriptionId, WebhookError> {
        SubscriptionId::parse(raw)
            .map_err(|e| WebhookError::ParseError(format!("invalid subscription id: {}", e)))
    }

    async fn order_for_cart(&self, cart_id: &CartId) -> Result<Option<Order>, WebhookError> {
        self.order_service
            .retrieve_by_cart_id(cart_id)
            .await
            .map_err(|e| WebhookError::Commerce(e.to_string()))
    }

    /// Authorize the cart's payment and create the order from it.
    ///
    /// Shared by the capturable-funds and invoice branches; the caller has
    /// already established that no order exists for the cart.
    async fn place_order_from_cart(
        &self,
        cart_id: &CartId,
        provider_id: &str,
    ) -> Result<Order, WebhookError> {
        if self
            .cart_service
            .retrieve(cart_id)
            .await
            .map_err(|e| WebhookError::Commerce(e.to_string()))?
            .is_none()
        {
            return Err(WebhookError::CartNotFound(cart_id.to_string()));
        }

        self.cart_service
            .set_payment_session(cart_id, provider_id)
            .await
            .map_err(|e| WebhookError::Commerce(e.to_string()))?;
        self.cart_service
            .authorize_payment(cart_id)
            .await
            .map_err(|e| WebhookError::Commerce(e.to_string()))?;
        self.order_service
            .create_from_cart(cart_id)
            .await
            .map_err(|e| WebhookError::Commerce(e.to_string()))
    }

    // ── payment_intent.* ────────────────────────────────────────────────

    async fn on_payment_intent_succeeded(
        &self,
        event: &StripeEvent,
    ) -> Result<(), WebhookError> {
        let intent: PaymentIntentPayload = event.deserialize_object()?;
        let cart_id = Self::parse_cart_id(intent.cart_id()?)?;

        match self.order_for_cart(&cart_id).await? {
            Some(order) if order.payment_status != PaymentStatus::Captured => {
                self.order_service
                    .capture_payment(&order.id)
                    .await
                    .map_err(|e| WebhookError::Commerce(e.to_string()))?;
                tracing::info!(order_id = %order.id, cart_id = %cart_id, "payment captured");
                Ok(())
            }
            // Already captured, or the order hasn't been created yet; the
            // capturable-funds event owns order creation.
            _ => Ok(()),
        }
    }

    async fn on_payment_intent_canceled(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let intent: PaymentIntentPayload = event.deserialize_object()?;
        let cart_id = Self::parse_cart_id(intent.cart_id()?)?;

        if let Some(order) = self.order_for_cart(&cart_id).await? {
            self.order_service
                .update_status(&order.id, OrderStatus::Canceled)
                .await
                .map_err(|e| WebhookError::Commerce(e.to_string()))?;
            tracing::info!(order_id = %order.id, "order canceled after intent cancellation");
        }
        Ok(())
    }

    async fn on_amount_capturable_updated(
        &self,
        event: &StripeEvent,
    ) -> Result<(), WebhookError> {
        let intent: PaymentIntentPayload = event.deserialize_object()?;
        let cart_id = Self::parse_cart_id(intent.cart_id()?)?;

        if self.order_for_cart(&cart_id).await?.is_none() {
            let order = self
                .place_order_from_cart(&cart_id, PROVIDER_STRIPE)
                .await?;
            tracing::info!(order_id = %order.id, cart_id = %cart_id, "order created from capturable intent");
        }
        Ok(())
    }

    // ── customer.subscription.* ─────────────────────────────────────────

    async fn on_subscription_updated(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let payload: SubscriptionPayload = event.deserialize_object()?;
        let id = Self::parse_subscription_id(&payload.id)?;

        let mut subscription = self
            .subscription_repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| WebhookError::SubscriptionNotFound(id.to_string()))?;

        subscription.update_status(payload.status.clone());
        subscription
            .update_next_payment_at(payload.current_period_end.map(Timestamp::from_unix));
        self.subscription_repository.update(&subscription).await?;

        let domain_event = SubscriptionEvent::updated(id, payload.status);
        self.event_publisher
            .publish(domain_event.to_envelope())
            .await?;
        Ok(())
    }

    async fn on_subscription_deleted(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        let payload: SubscriptionPayload = event.deserialize_object()?;
        let id = Self::parse_subscription_id(&payload.id)?;

        let outcome = self
            .subscription_repository
            .soft_delete(&id, Timestamp::now())
            .await?;

        if outcome == DeleteOutcome::Deleted {
            let domain_event = SubscriptionEvent::deleted(id.clone());
            self.event_publisher
                .publish(domain_event.to_envelope())
                .await?;
            tracing::info!(subscription_id = %id, "subscription ended by provider");
        }
        Ok(())
    }

    // ── invoice.* ───────────────────────────────────────────────────────

    /// Common invoice handling: ensure the referenced subscription exists,
    /// then create the order from the cart unless one already exists.
    async fn place_order_for_invoice(
        &self,
        event: &StripeEvent,
    ) -> Result<(Option<Order>, InvoicePayload), WebhookError> {
        let invoice: InvoicePayload = event.deserialize_object()?;

        if let Some(raw) = &invoice.subscription {
            let id = Self::parse_subscription_id(raw)?;
            if self
                .subscription_repository
                .find_by_id(&id)
                .await?
                .is_none()
            {
                return Err(WebhookError::SubscriptionNotFound(id.to_string()));
            }
        }

        let cart_id = Self::parse_cart_id(invoice.cart_id()?)?;

        if self.order_for_cart(&cart_id).await?.is_some() {
            return Ok((None, invoice));
        }

        let order = self
            .place_order_from_cart(&cart_id, PROVIDER_STRIPE_SUBSCRIPTION)
            .await?;
        tracing::info!(order_id = %order.id, invoice_id = %invoice.id, "order created from invoice");
        Ok((Some(order), invoice))
    }

    async fn on_invoice_paid(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        self.place_order_for_invoice(event).await?;
        Ok(())
    }

    async fn on_invoice_payment_action_required(
        &self,
        event: &StripeEvent,
    ) -> Result<(), WebhookError> {
        let (order, invoice) = self.place_order_for_invoice(event).await?;

        if let Some(order) = order {
            self.order_service
                .set_external_id(&order.id, &invoice.id)
                .await
                .map_err(|e| WebhookError::Commerce(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl WebhookDispatcher for BillingEventTranslator {
    async fn dispatch(&self, event: &StripeEvent) -> Result<(), WebhookError> {
        match event.parsed_type() {
            StripeEventType::PaymentIntentSucceeded => {
                self.on_payment_intent_succeeded(event).await
            }
            StripeEventType::PaymentIntentCanceled => self.on_payment_intent_canceled(event).await,
            StripeEventType::PaymentIntentAmountCapturableUpdated => {
                self.on_amount_capturable_updated(event).await
            }
            StripeEventType::SubscriptionUpdated => self.on_subscription_updated(event).await,
            StripeEventType::SubscriptionDeleted => self.on_subscription_deleted(event).await,
            StripeEventType::InvoicePaid | StripeEventType::InvoiceFinalized => {
                self.on_invoice_paid(event).await
            }
            StripeEventType::InvoicePaymentActionRequired => {
                self.on_invoice_payment_action_required(event).await
            }

            // Acknowledged without local effect.
            StripeEventType::PaymentIntentPaymentFailed
            | StripeEventType::PaymentIntentCreated
            | StripeEventType::CustomerCreated
            | StripeEventType::SubscriptionCreated
            | StripeEventType::InvoicePaymentFailed
            | StripeEventType::InvoiceUpcoming
            | StripeEventType::InvoiceCreated
            | StripeEventType::InvoiceFinalizationFailed => Ok(()),

            StripeEventType::Unknown => Err(WebhookError::Ignored(format!(
                "no handler for event type: {}",
                event.event_type
            ))),
        }
    }
}
