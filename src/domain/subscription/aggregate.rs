//! Subscription aggregate mirroring the billing provider's subscription.
//!
//! The local record is a projection of provider state: `status` carries the
//! provider's vocabulary verbatim (no local enumeration validates it), and
//! the aggregate id is either the provider's own `sub_...` identifier or a
//! locally generated one. Ids are assigned exactly once, at construction.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    SubscriptionId, SubscriptionItemId, Timestamp, ValidationError,
};

/// A recurring-billing subscription with its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Prefixed identifier, immutable after creation.
    pub id: SubscriptionId,

    /// Provider-defined status string, stored verbatim.
    pub status: String,

    /// Next expected charge, from the provider's current period end.
    pub next_payment_at: Option<Timestamp>,

    /// Opaque key-value bag.
    pub metadata: Option<serde_json::Value>,

    /// Owned items, one per provider subscription line.
    pub items: Vec<SubscriptionItem>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// Soft-delete marker set on cancellation.
    pub deleted_at: Option<Timestamp>,
}

/// A line within a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionItem {
    /// Prefixed identifier, immutable after creation.
    pub id: SubscriptionItemId,

    /// Parent subscription.
    pub subscription_id: SubscriptionId,

    /// Provider-defined billing period string (e.g. "month"), verbatim.
    pub period: Option<String>,

    /// Opaque key-value bag.
    pub metadata: Option<serde_json::Value>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Specification for an item on a new subscription.
#[derive(Debug, Clone, Default)]
pub struct NewSubscriptionItem {
    pub period: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl Subscription {
    /// Creates a subscription with its items.
    ///
    /// When `id` is `None` a fresh local identifier is generated; provider
    /// created subscriptions pass the provider's `sub_...` id through.
    /// Item identifiers are always generated locally.
    pub fn create(
        id: Option<SubscriptionId>,
        status: impl Into<String>,
        next_payment_at: Option<Timestamp>,
        metadata: Option<serde_json::Value>,
        items: Vec<NewSubscriptionItem>,
    ) -> Result<Self, ValidationError> {
        let status = status.into();
        if status.is_empty() {
            return Err(ValidationError::empty_field("status"));
        }

        let id = id.unwrap_or_else(SubscriptionId::generate);
        let now = Timestamp::now();

        let items = items
            .into_iter()
            .map(|spec| SubscriptionItem {
                id: SubscriptionItemId::generate(),
                subscription_id: id.clone(),
                period: spec.period,
                metadata: spec.metadata,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .collect();

        Ok(Self {
            id,
            status,
            next_payment_at,
            metadata,
            items,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Applies a provider status change.
    pub fn update_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.updated_at = Timestamp::now();
    }

    /// Moves the next expected charge.
    pub fn update_next_payment_at(&mut self, at: Option<Timestamp>) {
        self.next_payment_at = at;
        self.updated_at = Timestamp::now();
    }

    /// Replaces the metadata bag.
    pub fn update_metadata(&mut self, metadata: Option<serde_json::Value>) {
        self.metadata = metadata;
        self.updated_at = Timestamp::now();
    }

    /// Marks the subscription (and its items) soft-deleted.
    pub fn mark_deleted(&mut self, at: Timestamp) {
        self.deleted_at = Some(at);
        self.updated_at = at;
        for item in &mut self.items {
            item.deleted_at = Some(at);
            item.updated_at = at;
        }
    }

    /// Whether the subscription has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
