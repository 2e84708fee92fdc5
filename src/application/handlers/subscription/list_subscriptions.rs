//! ListSubscriptionsHandler - paged listing for the admin API.

use std::sync::Arc;

use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::{Pagination, SubscriptionRepository};

/// Query for a page of subscriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSubscriptionsQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Result page with the total live count.
#[derive(Debug, Clone)]
pub struct SubscriptionPage {
    pub subscriptions: Vec<Subscription>,
    pub count: u64,
    pub offset: u64,
    pub limit: u64,
}

pub struct ListSubscriptionsHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl ListSubscriptionsHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: ListSubscriptionsQuery,
    ) -> Result<SubscriptionPage, SubscriptionError> {
        let defaults = Pagination::default();
        let page = Pagination {
            offset: query.offset.unwrap_or(defaults.offset),
            limit: query.limit.unwrap_or(defaults.limit),
        };

        let (subscriptions, count) = self.repository.list(page).await?;

        Ok(SubscriptionPage {
            subscriptions,
            count,
            offset: page.offset,
            limit: page.limit,
        })
    }
}
