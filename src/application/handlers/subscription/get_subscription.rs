//! GetSubscriptionHandler - single subscription lookup.

use std::sync::Arc;

use crate::domain::foundation::SubscriptionId;
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::SubscriptionRepository;

/// Query for one subscription by id.
#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub id: SubscriptionId,
}

pub struct GetSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<Subscription, SubscriptionError> {
        self.repository
            .find_by_id(&query.id)
            .await?
            .ok_or_else(|| SubscriptionError::NotFound(query.id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::InMemorySubscriptionRepository;
    use crate::domain::subscription::Subscription as Sub;

    #[tokio::test]
    async fn returns_existing_subscription() {
        let sub = Sub::create(None, "active", None, None, vec![]).unwrap();
        let id = sub.id.clone();
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscription(sub));
        let handler = GetSubscriptionHandler::new(repo);

        let found = handler
            .handle(GetSubscriptionQuery { id: id.clone() })
            .await
            .unwrap();

        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn missing_subscription_is_not_found() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let handler = GetSubscriptionHandler::new(repo);

        let result = handler
            .handle(GetSubscriptionQuery {
                id: SubscriptionId::parse("sub_missing").unwrap(),
            })
            .await;

        assert!(matches!(result, Err(SubscriptionError::NotFound(_))));
    }
}
