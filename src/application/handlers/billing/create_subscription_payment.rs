//! CreateSubscriptionPaymentHandler - starts a recurring payment for a cart.
//!
//! Mirrors the provider-side flow: ensure a provider customer, create a
//! provider subscription with one price per cart line (incomplete until the
//! first invoice is paid), create the local Subscription, link the cart,
//! and stamp the cart id into the first invoice's metadata so webhook
//! events can be correlated back.

use std::sync::Arc;

use crate::domain::foundation::{CartId, SubscriptionId};
use crate::domain::subscription::{NewSubscriptionItem, Subscription, SubscriptionError};
use crate::ports::{
    BillingProvider, Cart, CartService, CreateCustomerRequest,
    CreateProviderSubscriptionRequest, CustomerService, EventPublisher, ProviderSubscription,
    SubscriptionRepository, VariantService,
};

use crate::application::handlers::subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler,
};

/// Command to create a subscription payment for a cart.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionPaymentCommand {
    pub cart_id: CartId,
}

/// Result: the provider subscription plus the local record's id.
#[derive(Debug, Clone)]
pub struct SubscriptionPayment {
    pub provider_subscription: ProviderSubscription,
    pub subscription_id: SubscriptionId,
}

pub struct CreateSubscriptionPaymentHandler {
    cart_service: Arc<dyn CartService>,
    customer_service: Arc<dyn CustomerService>,
    variant_service: Arc<dyn VariantService>,
    billing_provider: Arc<dyn BillingProvider>,
    subscription_repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateSubscriptionPaymentHandler {
    pub fn new(
        cart_service: Arc<dyn CartService>,
        customer_service: Arc<dyn CustomerService>,
        variant_service: Arc<dyn VariantService>,
        billing_provider: Arc<dyn BillingProvider>,
        subscription_repository: Arc<dyn SubscriptionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            cart_service,
            customer_service,
            variant_service,
            billing_provider,
            subscription_repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionPaymentCommand,
    ) -> Result<SubscriptionPayment, SubscriptionError> {
        let cart = self
            .cart_service
            .retrieve(&cmd.cart_id)
            .await?
            .ok_or_else(|| {
                SubscriptionError::infrastructure(format!("cart {} not found", cmd.cart_id))
            })?;

        let price_ids = self.resolve_prices(&cart).await?;
        let provider_customer_id = self.ensure_provider_customer(&cart).await?;

        let provider_subscription = self
            .billing_provider
            .create_subscription(CreateProviderSubscriptionRequest {
                customer_id: provider_customer_id,
                price_ids,
                cart_id: cart.id.to_string(),
            })
            .await
            .map_err(|e| SubscriptionError::provider(e.to_string()))?;

        // Local record keeps the provider's id; one item per provider line.
        let local_id = SubscriptionId::parse(provider_subscription.id.as_str())?;
        let items = provider_subscription
            .lines
            .iter()
            .map(|line| NewSubscriptionItem {
                period: line.period.clone(),
                metadata: Some(serde_json::json!({
                    "provider_line_id": line.id,
                    "price_id": line.price_id,
                })),
            })
            .collect();

        let create_handler = CreateSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.event_publisher.clone(),
        );
        let subscription: Subscription = create_handler
            .handle(CreateSubscriptionCommand {
                id: Some(local_id.clone()),
                status: provider_subscription.status.clone(),
                next_payment_at: None,
                metadata: Some(serde_json::json!({"cart_id": cart.id.to_string()})),
                items,
            })
            .await?;

        let invoice_id = provider_subscription
            .latest_invoice_id
            .clone()
            .unwrap_or_default();
        self.cart_service
            .link_subscription(&cart.id, &subscription.id, &invoice_id)
            .await?;

        for (line_item, subscription_item) in cart.items.iter().zip(subscription.items.iter()) {
            self.cart_service
                .link_line_item(&line_item.id, &subscription_item.id)
                .await?;
        }

        if !invoice_id.is_empty() {
            self.billing_provider
                .update_invoice_metadata(&invoice_id, "cart_id", cart.id.as_str())
                .await
                .map_err(|e| SubscriptionError::provider(e.to_string()))?;
        }

        tracing::info!(
            cart_id = %cart.id,
            subscription_id = %subscription.id,
            "subscription payment created"
        );

        Ok(SubscriptionPayment {
            provider_subscription,
            subscription_id: subscription.id,
        })
    }

    /// Resolves one provider price per cart line from the mirrored catalog.
    async fn resolve_prices(&self, cart: &Cart) -> Result<Vec<String>, SubscriptionError> {
        let mut price_ids = Vec::with_capacity(cart.items.len());

        for item in &cart.items {
            let variant = self
                .variant_service
                .retrieve(&item.variant_id)
                .await?
                .ok_or_else(|| {
                    SubscriptionError::infrastructure(format!(
                        "variant {} not found",
                        item.variant_id
                    ))
                })?;

            let price = self
                .billing_provider
                .find_price_for_product(variant.id.as_str(), &cart.currency_code)
                .await
                .map_err(|e| SubscriptionError::provider(e.to_string()))?
                .ok_or_else(|| {
                    SubscriptionError::provider(format!(
                        "no {} price for variant {}",
                        cart.currency_code, variant.id
                    ))
                })?;

            price_ids.push(price.id);
        }

        Ok(price_ids)
    }

    /// Returns the provider customer id for the cart, creating one if needed.
    async fn ensure_provider_customer(&self, cart: &Cart) -> Result<String, SubscriptionError> {
        if let Some(customer_id) = &cart.customer_id {
            let customer = self
                .customer_service
                .retrieve(customer_id)
                .await?
                .ok_or_else(|| {
                    SubscriptionError::infrastructure(format!(
                        "customer {} not found",
                        customer_id
                    ))
                })?;

            if let Some(provider_id) = customer.provider_customer_id {
                return Ok(provider_id);
            }

            let created = self
                .billing_provider
                .create_customer(CreateCustomerRequest {
                    customer_id: Some(customer.id.clone()),
                    email: customer.email,
                    name: customer.name,
                })
                .await
                .map_err(|e| SubscriptionError::provider(e.to_string()))?;

            self.customer_service
                .set_provider_customer_id(&customer.id, &created.id)
                .await?;

            return Ok(created.id);
        }

        // Guest checkout: a bare provider customer from the cart email.
        let email = cart.email.clone().ok_or_else(|| {
            SubscriptionError::infrastructure("cart has neither customer nor email")
        })?;

        let created = self
            .billing_provider
            .create_customer(CreateCustomerRequest {
                customer_id: None,
                email,
                name: None,
            })
            .await
            .map_err(|e| SubscriptionError::provider(e.to_string()))?;

        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::{
        MockBillingProvider, MockCustomerService,
    };
    use crate::application::handlers::subscription::test_support::{
        InMemorySubscriptionRepository, RecordingEventPublisher,
    };
    use crate::domain::foundation::{
        CustomerId, DomainError, LineItemId, SubscriptionItemId, VariantId,
    };
    use crate::ports::{CartLineItem, Customer, ProductVariant};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubCartService {
        cart: Option<Cart>,
        links: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl CartService for StubCartService {
        async fn retrieve(&self, id: &CartId) -> Result<Option<Cart>, DomainError> {
            Ok(self.cart.clone().filter(|c| &c.id == id))
        }

        async fn link_subscription(
            &self,
            id: &CartId,
            subscription_id: &SubscriptionId,
            external_id: &str,
        ) -> Result<(), DomainError> {
            self.links.lock().unwrap().push((
                id.to_string(),
                subscription_id.to_string(),
                external_id.to_string(),
            ));
            Ok(())
        }

        async fn link_line_item(
            &self,
            _line_item_id: &LineItemId,
            _subscription_item_id: &SubscriptionItemId,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn set_payment_session(
            &self,
            _id: &CartId,
            _provider_id: &str,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn authorize_payment(&self, _id: &CartId) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct StubVariantService;

    #[async_trait]
    impl VariantService for StubVariantService {
        async fn retrieve(
            &self,
            id: &VariantId,
        ) -> Result<Option<ProductVariant>, DomainError> {
            Ok(Some(ProductVariant {
                id: id.clone(),
                product_id: "prod_1".to_string(),
                title: "Monthly coffee".to_string(),
                is_subscription: true,
                is_digital: false,
                subscription_period: Some("month".to_string()),
            }))
        }
    }

    fn cart_with_customer(items: usize) -> Cart {
        Cart {
            id: CartId::new("cart_1").unwrap(),
            customer_id: Some(CustomerId::new("cust_1").unwrap()),
            email: Some("shopper@example.com".to_string()),
            currency_code: "usd".to_string(),
            subscription_id: None,
            external_id: None,
            selected_payment_provider: None,
            items: (0..items)
                .map(|i| CartLineItem {
                    id: LineItemId::new(format!("item_{}", i)).unwrap(),
                    variant_id: VariantId::new(format!("variant_{}", i)).unwrap(),
                    title: format!("Line {}", i),
                    quantity: 1,
                    subscription_item_id: None,
                })
                .collect(),
        }
    }

    struct Fixture {
        handler: CreateSubscriptionPaymentHandler,
        repository: Arc<InMemorySubscriptionRepository>,
        provider: Arc<MockBillingProvider>,
        customer_service: Arc<MockCustomerService>,
        cart_service: Arc<StubCartService>,
    }

    fn fixture(cart: Cart, customer: Option<Customer>) -> Fixture {
        let repository = Arc::new(InMemorySubscriptionRepository::new());
        let provider = Arc::new(MockBillingProvider::new());
        let customer_service = Arc::new(match customer {
            Some(c) => MockCustomerService::with_customer(c),
            None => MockCustomerService::empty(),
        });
        let cart_service = Arc::new(StubCartService {
            cart: Some(cart),
            links: Mutex::new(Vec::new()),
        });
        Fixture {
            handler: CreateSubscriptionPaymentHandler::new(
                cart_service.clone(),
                customer_service.clone(),
                Arc::new(StubVariantService),
                provider.clone(),
                repository.clone(),
                Arc::new(RecordingEventPublisher::new()),
            ),
            repository,
            provider,
            customer_service,
            cart_service,
        }
    }

    fn customer_without_provider_link() -> Customer {
        Customer {
            id: CustomerId::new("cust_1").unwrap(),
            email: "shopper@example.com".to_string(),
            name: Some("Shopper".to_string()),
            provider_customer_id: None,
        }
    }

    #[tokio::test]
    async fn creates_local_subscription_with_item_per_line() {
        let f = fixture(cart_with_customer(2), Some(customer_without_provider_link()));

        let payment = f
            .handler
            .handle(CreateSubscriptionPaymentCommand {
                cart_id: CartId::new("cart_1").unwrap(),
            })
            .await
            .unwrap();

        let stored = f
            .repository
            .find_by_id(&payment.subscription_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id.as_str(), "sub_mock123");
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.status, "incomplete");
    }

    #[tokio::test]
    async fn links_cart_to_subscription_and_invoice() {
        let f = fixture(cart_with_customer(1), Some(customer_without_provider_link()));

        f.handler
            .handle(CreateSubscriptionPaymentCommand {
                cart_id: CartId::new("cart_1").unwrap(),
            })
            .await
            .unwrap();

        let links = f.cart_service.links.lock().unwrap().clone();
        assert_eq!(
            links,
            vec![(
                "cart_1".to_string(),
                "sub_mock123".to_string(),
                "in_mock123".to_string()
            )]
        );

        let stamped = f.provider.invoice_metadata.lock().unwrap().clone();
        assert_eq!(
            stamped,
            vec![(
                "in_mock123".to_string(),
                "cart_id".to_string(),
                "cart_1".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn stores_provider_customer_link_after_creation() {
        let f = fixture(cart_with_customer(1), Some(customer_without_provider_link()));

        f.handler
            .handle(CreateSubscriptionPaymentCommand {
                cart_id: CartId::new("cart_1").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(
            f.customer_service.linked_provider_id(),
            Some("cus_mock".to_string())
        );
    }

    #[tokio::test]
    async fn guest_cart_uses_cart_email() {
        let mut cart = cart_with_customer(1);
        cart.customer_id = None;
        let f = fixture(cart, None);

        let payment = f
            .handler
            .handle(CreateSubscriptionPaymentCommand {
                cart_id: CartId::new("cart_1").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(payment.provider_subscription.id, "sub_mock123");
    }

    #[tokio::test]
    async fn unknown_cart_is_an_error() {
        let f = fixture(cart_with_customer(1), Some(customer_without_provider_link()));

        let result = f
            .handler
            .handle(CreateSubscriptionPaymentCommand {
                cart_id: CartId::new("cart_missing").unwrap(),
            })
            .await;

        assert!(matches!(result, Err(SubscriptionError::Infrastructure(_))));
        assert!(f.provider.subscription_requests.lock().unwrap().is_empty());
    }
}
