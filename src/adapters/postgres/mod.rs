//! PostgreSQL adapters for the persistence ports.

mod cart_service;
mod customer_service;
mod order_service;
mod subscription_repository;
mod variant_service;
mod webhook_event_repository;

pub use cart_service::PostgresCartService;
pub use customer_service::PostgresCustomerService;
pub use order_service::PostgresOrderService;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use variant_service::PostgresVariantService;
pub use webhook_event_repository::PostgresWebhookEventRepository;
