//! DeleteSubscriptionHandler - soft delete from the admin API or webhook.
//!
//! Deleting a subscription that does not exist is a no-op; the deleted
//! event is only published when a row was actually marked.

use std::sync::Arc;

use crate::domain::foundation::{DomainEvent, SubscriptionId, Timestamp};
use crate::domain::subscription::{SubscriptionError, SubscriptionEvent};
use crate::ports::{DeleteOutcome, EventPublisher, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct DeleteSubscriptionCommand {
    pub id: SubscriptionId,
}

pub struct DeleteSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl DeleteSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: DeleteSubscriptionCommand,
    ) -> Result<DeleteOutcome, SubscriptionError> {
        let outcome = self
            .repository
            .soft_delete(&cmd.id, Timestamp::now())
            .await?;

        match outcome {
            DeleteOutcome::Deleted => {
                let event = SubscriptionEvent::deleted(cmd.id.clone());
                self.event_publisher.publish(event.to_envelope()).await?;
                tracing::info!(subscription_id = %cmd.id, "subscription deleted");
            }
            DeleteOutcome::NotFound => {
                tracing::debug!(subscription_id = %cmd.id, "delete of unknown subscription ignored");
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::subscription::test_support::{
        InMemorySubscriptionRepository, RecordingEventPublisher,
    };
    use crate::domain::subscription::Subscription as Sub;

    #[tokio::test]
    async fn deletes_existing_subscription() {
        let sub = Sub::create(None, "active", None, None, vec![]).unwrap();
        let id = sub.id.clone();
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscription(sub));
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = DeleteSubscriptionHandler::new(repo.clone(), publisher.clone());

        let outcome = handler
            .handle(DeleteSubscriptionCommand { id: id.clone() })
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert_eq!(publisher.events().len(), 1);
        assert_eq!(publisher.events()[0].event_type, "subscription.deleted");
    }

    use crate::ports::SubscriptionRepository;

    #[tokio::test]
    async fn deleting_missing_subscription_is_a_noop() {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = DeleteSubscriptionHandler::new(repo, publisher.clone());

        let outcome = handler
            .handle(DeleteSubscriptionCommand {
                id: SubscriptionId::parse("sub_missing").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert!(publisher.events().is_empty());
    }

    #[tokio::test]
    async fn double_delete_is_a_noop_the_second_time() {
        let sub = Sub::create(None, "active", None, None, vec![]).unwrap();
        let id = sub.id.clone();
        let repo = Arc::new(InMemorySubscriptionRepository::with_subscription(sub));
        let publisher = Arc::new(RecordingEventPublisher::new());
        let handler = DeleteSubscriptionHandler::new(repo, publisher.clone());

        let first = handler
            .handle(DeleteSubscriptionCommand { id: id.clone() })
            .await
            .unwrap();
        let second = handler
            .handle(DeleteSubscriptionCommand { id })
            .await
            .unwrap();

        assert_eq!(first, DeleteOutcome::Deleted);
        assert_eq!(second, DeleteOutcome::NotFound);
        assert_eq!(publisher.events().len(), 1);
    }
}
