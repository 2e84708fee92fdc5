//! Port traits decoupling the domain/application layers from adapters.

mod billing_provider;
mod cart_service;
mod customer_service;
mod event_bus;
mod order_service;
mod subscription_repository;
mod variant_service;
mod webhook_event_repository;

pub use billing_provider::{
    BillingError, BillingErrorCode, BillingProvider, CreateCustomerRequest,
    CreateProviderSubscriptionRequest, PortalSession, ProviderCustomer, ProviderPrice,
    ProviderSubscription, ProviderSubscriptionLine,
};
pub use cart_service::{Cart, CartLineItem, CartService};
pub use customer_service::{Customer, CustomerService};
pub use event_bus::{EventPublisher, EventSubscriber, SubscriberCallback};
pub use order_service::{Order, OrderService, OrderStatus, PaymentStatus};
pub use subscription_repository::{DeleteOutcome, Pagination, SubscriptionRepository};
pub use variant_service::{ProductVariant, VariantService};
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
