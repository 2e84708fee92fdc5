//! CustomerService port - read/write access to platform customers.
//!
//! The provider customer id lives in the customer's metadata bag
//! (`stripe_id`), matching how the platform stores gateway references.

use async_trait::async_trait;

use crate::domain::foundation::{CustomerId, DomainError};

/// Read model of a platform customer.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub name: Option<String>,
    /// Provider customer id (cus_...) from metadata, if linked.
    pub provider_customer_id: Option<String>,
}

/// Port over the platform's customer service.
#[async_trait]
pub trait CustomerService: Send + Sync {
    /// Loads a customer by id.
    async fn retrieve(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError>;

    /// Records the provider customer id in the customer's metadata.
    async fn set_provider_customer_id(
        &self,
        id: &CustomerId,
        provider_customer_id: &str,
    ) -> Result<(), DomainError>;
}
