//! SubscriptionRepository port - persistence for the Subscription aggregate.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp};
use crate::domain::subscription::Subscription;

/// Page window for list queries.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Rows to skip.
    pub offset: u64,
    /// Maximum rows to return.
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// Outcome of a soft delete.
///
/// Deleting a subscription that does not exist is a no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// A row was marked deleted.
    Deleted,
    /// No live row matched the id.
    NotFound,
}

/// Port for storing and retrieving subscriptions with their items.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Persists a new subscription and all of its items atomically.
    async fn create(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Updates a subscription's mutable fields (never the id).
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Finds a live subscription by id, items included.
    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Lists live subscriptions newest-first with the total live count.
    async fn list(&self, page: Pagination) -> Result<(Vec<Subscription>, u64), DomainError>;

    /// Soft-deletes a subscription and its items.
    async fn soft_delete(
        &self,
        id: &SubscriptionId,
        at: Timestamp,
    ) -> Result<DeleteOutcome, DomainError>;
}
