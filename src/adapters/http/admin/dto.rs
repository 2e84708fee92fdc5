//! Request/response DTOs for the admin subscription API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::handlers::subscription::SubscriptionPage;
use crate::domain::subscription::{Subscription, SubscriptionItem};

/// One subscription as returned by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub status: String,
    pub next_payment_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
    pub items: Vec<SubscriptionItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One subscription item as returned by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionItemResponse {
    pub id: String,
    pub subscription_id: String,
    pub period: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id.to_string(),
            status: subscription.status,
            next_payment_at: subscription.next_payment_at.map(|t| t.as_datetime()),
            metadata: subscription.metadata,
            items: subscription
                .items
                .into_iter()
                .map(SubscriptionItemResponse::from)
                .collect(),
            created_at: subscription.created_at.as_datetime(),
            updated_at: subscription.updated_at.as_datetime(),
        }
    }
}

impl From<SubscriptionItem> for SubscriptionItemResponse {
    fn from(item: SubscriptionItem) -> Self {
        Self {
            id: item.id.to_string(),
            subscription_id: item.subscription_id.to_string(),
            period: item.period,
            metadata: item.metadata,
            created_at: item.created_at.as_datetime(),
        }
    }
}

/// Query parameters for the listing endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListSubscriptionsParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Response for `GET /admin/subscriptions`.
#[derive(Debug, Clone, Serialize)]
pub struct ListSubscriptionsResponse {
    pub subscriptions: Vec<SubscriptionResponse>,
    pub count: u64,
    pub offset: u64,
    pub limit: u64,
}

impl From<SubscriptionPage> for ListSubscriptionsResponse {
    fn from(page: SubscriptionPage) -> Self {
        Self {
            subscriptions: page
                .subscriptions
                .into_iter()
                .map(SubscriptionResponse::from)
                .collect(),
            count: page.count,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

/// Response envelope for single-subscription endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionEnvelope {
    pub subscription: SubscriptionResponse,
}

/// Body for `POST /admin/subscriptions/:id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub status: Option<String>,
    pub next_payment_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

/// Response for `DELETE /admin/subscriptions/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteSubscriptionResponse {
    pub id: String,
    pub object: &'static str,
    pub deleted: bool,
}

impl DeleteSubscriptionResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object: "subscription",
            deleted: true,
        }
    }
}
