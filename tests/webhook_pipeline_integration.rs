//! Integration tests for the webhook pipeline.
//!
//! These tests verify the end-to-end flow:
//! 1. Signature verification gates everything (invalid signature -> no
//!    downstream call)
//! 2. The idempotent processor deduplicates deliveries by event id
//! 3. The translator maps event types onto cart/order/subscription
//!    operations
//!
//! Uses in-memory implementations to test the pipeline without external
//! dependencies.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

use commerce_billing::application::handlers::billing::BillingEventTranslator;
use commerce_billing::domain::billing::{
    IdempotentWebhookProcessor, StripeWebhookVerifier, WebhookError,
};
use commerce_billing::domain::foundation::{
    CartId, DomainError, EventEnvelope, LineItemId, OrderId, SubscriptionId, SubscriptionItemId,
    Timestamp, VariantId,
};
use commerce_billing::domain::subscription::Subscription;
use commerce_billing::ports::{
    Cart, CartLineItem, CartService, DeleteOutcome, EventPublisher, Order, OrderService,
    OrderStatus, Pagination, PaymentStatus, SaveResult, SubscriptionRepository,
    WebhookEventRecord, WebhookEventRepository, WebhookResult,
};

const TEST_SECRET: &str = "whsec_integration_secret";

// =============================================================================
// Test Infrastructure
// =============================================================================

fn sign(payload: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SECRET.as_bytes())
        .expect("HMAC accepts any key");
    mac.update(signed_payload.as_bytes());
    let hex: String = mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    format!("t={},v1={}", timestamp, hex)
}

struct TestWebhookStore {
    records: RwLock<HashMap<String, WebhookEventRecord>>,
}

impl TestWebhookStore {
    fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl WebhookEventRepository for TestWebhookStore {
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError> {
        Ok(self.records.read().await.get(event_id).cloned())
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        match records.get(&record.event_id) {
            Some(existing) if existing.result != "failed" => Ok(SaveResult::AlreadyExists),
            _ => {
                records.insert(record.event_id.clone(), record);
                Ok(SaveResult::Inserted)
            }
        }
    }

    async fn delete_before(
        &self,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.processed_at >= timestamp);
        Ok((before - records.len()) as u64)
    }
}

struct TestSubscriptionRepository {
    rows: Mutex<HashMap<String, Subscription>>,
}

impl TestSubscriptionRepository {
    fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    fn seed(&self, subscription: Subscription) {
        self.rows
            .lock()
            .unwrap()
            .insert(subscription.id.to_string(), subscription);
    }

    fn status_of(&self, id: &SubscriptionId) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .get(id.as_str())
            .map(|s| s.status.clone())
    }
}

#[async_trait]
impl SubscriptionRepository for TestSubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.seed(subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.seed(subscription.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(id.as_str())
            .filter(|s| !s.is_deleted())
            .cloned())
    }

    async fn list(&self, _page: Pagination) -> Result<(Vec<Subscription>, u64), DomainError> {
        let rows = self.rows.lock().unwrap();
        let live: Vec<Subscription> =
            rows.values().filter(|s| !s.is_deleted()).cloned().collect();
        let count = live.len() as u64;
        Ok((live, count))
    }

    async fn soft_delete(
        &self,
        id: &SubscriptionId,
        at: Timestamp,
    ) -> Result<DeleteOutcome, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(id.as_str()) {
            Some(sub) if !sub.is_deleted() => {
                sub.mark_deleted(at);
                Ok(DeleteOutcome::Deleted)
            }
            _ => Ok(DeleteOutcome::NotFound),
        }
    }
}

/// Cart/order service that counts every mutating call.
struct TestCommerce {
    cart: Option<Cart>,
    orders: Mutex<Vec<Order>>,
    mutations: AtomicUsize,
}

impl TestCommerce {
    fn with_cart(cart_id: &str) -> Arc<Self> {
        Arc::new(Self {
            cart: Some(Cart {
                id: CartId::new(cart_id).unwrap(),
                customer_id: None,
                email: Some("shopper@example.com".to_string()),
                currency_code: "usd".to_string(),
                subscription_id: None,
                external_id: None,
                selected_payment_provider: None,
                items: vec![CartLineItem {
                    id: LineItemId::new("item_1").unwrap(),
                    variant_id: VariantId::new("variant_1").unwrap(),
                    title: "Monthly box".to_string(),
                    quantity: 1,
                    subscription_item_id: None,
                }],
            }),
            orders: Mutex::new(Vec::new()),
            mutations: AtomicUsize::new(0),
        })
    }

    fn empty() -> Arc<Self> {
        Arc::new(Self {
            cart: None,
            orders: Mutex::new(Vec::new()),
            mutations: AtomicUsize::new(0),
        })
    }

    fn seed_order(&self, cart_id: &str, payment_status: PaymentStatus) {
        self.orders.lock().unwrap().push(Order {
            id: OrderId::new("order_seeded").unwrap(),
            cart_id: CartId::new(cart_id).unwrap(),
            status: OrderStatus::Pending,
            payment_status,
            external_id: None,
        });
    }

    fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

#[async_trait]
impl CartService for TestCommerce {
    async fn retrieve(&self, id: &CartId) -> Result<Option<Cart>, DomainError> {
        Ok(self.cart.clone().filter(|c| &c.id == id))
    }

    async fn link_subscription(
        &self,
        _id: &CartId,
        _subscription_id: &SubscriptionId,
        _external_id: &str,
    ) -> Result<(), DomainError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn link_line_item(
        &self,
        _line_item_id: &LineItemId,
        _subscription_item_id: &SubscriptionItemId,
    ) -> Result<(), DomainError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_payment_session(
        &self,
        _id: &CartId,
        _provider_id: &str,
    ) -> Result<(), DomainError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn authorize_payment(&self, _id: &CartId) -> Result<(), DomainError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl OrderService for TestCommerce {
    async fn retrieve_by_cart_id(&self, cart_id: &CartId) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| &o.cart_id == cart_id)
            .cloned())
    }

    async fn create_from_cart(&self, cart_id: &CartId) -> Result<Order, DomainError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let order = Order {
            id: OrderId::new("order_created").unwrap(),
            cart_id: cart_id.clone(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Authorized,
            external_id: None,
        };
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn capture_payment(&self, _id: &OrderId) -> Result<(), DomainError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_status(
        &self,
        _id: &OrderId,
        _status: OrderStatus,
    ) -> Result<(), DomainError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_external_id(
        &self,
        _id: &OrderId,
        _external_id: &str,
    ) -> Result<(), DomainError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct NullPublisher;

#[async_trait]
impl EventPublisher for NullPublisher {
    async fn publish(&self, _event: EventEnvelope) -> Result<(), DomainError> {
        Ok(())
    }

    async fn publish_all(&self, _events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        Ok(())
    }
}

struct Pipeline {
    verifier: StripeWebhookVerifier,
    processor: IdempotentWebhookProcessor,
    commerce: Arc<TestCommerce>,
    repository: Arc<TestSubscriptionRepository>,
}

fn pipeline(commerce: Arc<TestCommerce>) -> Pipeline {
    let repository = Arc::new(TestSubscriptionRepository::new());
    let translator = Arc::new(BillingEventTranslator::new(
        commerce.clone(),
        commerce.clone(),
        repository.clone(),
        Arc::new(NullPublisher),
    ));
    Pipeline {
        verifier: StripeWebhookVerifier::new(TEST_SECRET),
        processor: IdempotentWebhookProcessor::new(Arc::new(TestWebhookStore::new()), translator),
        commerce,
        repository,
    }
}

fn event_payload(event_id: &str, event_type: &str, object: serde_json::Value) -> String {
    json!({
        "id": event_id,
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "data": {"object": object},
        "livemode": false,
        "api_version": "2023-10-16"
    })
    .to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn invalid_signature_invokes_no_downstream_service() {
    let commerce = TestCommerce::with_cart("cart_1");
    let p = pipeline(commerce.clone());
    let payload = event_payload(
        "evt_1",
        "payment_intent.succeeded",
        json!({"id": "pi_1", "object": "payment_intent", "metadata": {"cart_id": "cart_1"}}),
    );
    let timestamp = chrono::Utc::now().timestamp();
    let forged = format!("t={},v1={}", timestamp, "a".repeat(64));

    let result = p.verifier.verify_and_parse(payload.as_bytes(), &forged);

    assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    assert_eq!(commerce.mutation_count(), 0);
}

#[tokio::test]
async fn valid_delivery_flows_through_to_capture() {
    let commerce = TestCommerce::with_cart("cart_1");
    commerce.seed_order("cart_1", PaymentStatus::Authorized);
    let p = pipeline(commerce.clone());

    let payload = event_payload(
        "evt_capture",
        "payment_intent.succeeded",
        json!({"id": "pi_1", "object": "payment_intent", "metadata": {"cart_id": "cart_1"}}),
    );
    let event = p
        .verifier
        .verify_and_parse(payload.as_bytes(), &sign(&payload))
        .unwrap();

    let result = p.processor.process(event).await.unwrap();

    assert_eq!(result, WebhookResult::Processed);
    assert_eq!(commerce.mutation_count(), 1); // the capture call
}

#[tokio::test]
async fn duplicate_delivery_mutates_state_once() {
    let commerce = TestCommerce::with_cart("cart_1");
    let p = pipeline(commerce.clone());

    let payload = event_payload(
        "evt_dup",
        "invoice.paid",
        json!({"id": "in_1", "object": "invoice", "metadata": {"cart_id": "cart_1"}}),
    );

    let first = p
        .verifier
        .verify_and_parse(payload.as_bytes(), &sign(&payload))
        .unwrap();
    let second = p
        .verifier
        .verify_and_parse(payload.as_bytes(), &sign(&payload))
        .unwrap();

    assert_eq!(
        p.processor.process(first).await.unwrap(),
        WebhookResult::Processed
    );
    let mutations_after_first = commerce.mutation_count();

    assert_eq!(
        p.processor.process(second).await.unwrap(),
        WebhookResult::AlreadyProcessed
    );

    assert_eq!(commerce.mutation_count(), mutations_after_first);
    assert_eq!(commerce.order_count(), 1);
}

#[tokio::test]
async fn unknown_event_type_is_ignored_with_no_state_change() {
    let commerce = TestCommerce::with_cart("cart_1");
    let p = pipeline(commerce.clone());

    let payload = event_payload("evt_unknown", "charge.refunded", json!({"id": "ch_1"}));
    let event = p
        .verifier
        .verify_and_parse(payload.as_bytes(), &sign(&payload))
        .unwrap();

    let result = p.processor.process(event).await.unwrap();

    assert_eq!(result, WebhookResult::Ignored);
    assert_eq!(commerce.mutation_count(), 0);
}

#[tokio::test]
async fn malformed_object_for_known_type_fails_without_state_change() {
    let commerce = TestCommerce::with_cart("cart_1");
    let p = pipeline(commerce.clone());

    // Recognized type, but data.object lacks the subscription shape.
    let payload = event_payload(
        "evt_malformed",
        "customer.subscription.updated",
        json!({"id": "sub_1"}),
    );
    let event = p
        .verifier
        .verify_and_parse(payload.as_bytes(), &sign(&payload))
        .unwrap();

    let result = p.processor.process(event).await;

    assert!(matches!(result, Err(WebhookError::ParseError(_))));
    assert_eq!(commerce.mutation_count(), 0);
}

#[tokio::test]
async fn subscription_status_follows_provider_update() {
    let commerce = TestCommerce::empty();
    let p = pipeline(commerce);

    let subscription =
        Subscription::create(None, "incomplete", None, None, vec![]).unwrap();
    let id = subscription.id.clone();
    p.repository.seed(subscription);

    let payload = event_payload(
        "evt_status",
        "customer.subscription.updated",
        json!({
            "id": id.as_str(),
            "object": "subscription",
            "status": "active",
            "current_period_end": 1735689600
        }),
    );
    let event = p
        .verifier
        .verify_and_parse(payload.as_bytes(), &sign(&payload))
        .unwrap();

    assert_eq!(
        p.processor.process(event).await.unwrap(),
        WebhookResult::Processed
    );
    assert_eq!(p.repository.status_of(&id).as_deref(), Some("active"));
}

#[tokio::test]
async fn subscription_deletion_event_soft_deletes_and_redelivery_is_safe() {
    let commerce = TestCommerce::empty();
    let p = pipeline(commerce);

    let subscription = Subscription::create(None, "active", None, None, vec![]).unwrap();
    let id = subscription.id.clone();
    p.repository.seed(subscription);

    let object = json!({
        "id": id.as_str(),
        "object": "subscription",
        "status": "canceled"
    });

    let payload = event_payload("evt_del_1", "customer.subscription.deleted", object.clone());
    let event = p
        .verifier
        .verify_and_parse(payload.as_bytes(), &sign(&payload))
        .unwrap();
    p.processor.process(event).await.unwrap();

    assert!(p.repository.find_by_id(&id).await.unwrap().is_none());

    // A second deletion event (distinct id, e.g. manual replay) is a no-op.
    let payload = event_payload("evt_del_2", "customer.subscription.deleted", object);
    let event = p
        .verifier
        .verify_and_parse(payload.as_bytes(), &sign(&payload))
        .unwrap();
    let result = p.processor.process(event).await.unwrap();

    assert_eq!(result, WebhookResult::Processed);
}
