//! Shared in-memory fakes for subscription handler tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, EventEnvelope, SubscriptionId, Timestamp};
use crate::domain::subscription::Subscription;
use crate::ports::{
    DeleteOutcome, EventPublisher, Pagination, SubscriptionRepository,
};

/// HashMap-backed repository mirroring the postgres adapter's semantics.
pub struct InMemorySubscriptionRepository {
    rows: Mutex<HashMap<String, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_subscription(subscription: Subscription) -> Self {
        let repo = Self::new();
        repo.rows
            .lock()
            .unwrap()
            .insert(subscription.id.to_string(), subscription);
        repo
    }

    pub async fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.rows
            .lock()
            .unwrap()
            .insert(subscription.id.to_string(), subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(subscription.id.as_str()) {
            return Err(DomainError::subscription_not_found(&subscription.id));
        }
        rows.insert(subscription.id.to_string(), subscription.clone());
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

    async fn list(&self, page: Pagination) -> Result<(Vec<Subscription>, u64), DomainError> {
        let rows = self.rows.lock().unwrap();
        let mut live: Vec<Subscription> =
            rows.values().filter(|s| !s.is_deleted()).cloned().collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let count = live.len() as u64;
        let page_rows = live
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect();
        Ok((page_rows, count))
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

/// Publisher that records every envelope for assertions.
pub struct RecordingEventPublisher {
    events: Mutex<Vec<EventEnvelope>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        self.events.lock().unwrap().extend(events);
        Ok(())
    }
}
