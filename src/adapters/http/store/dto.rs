//! Request/response DTOs for the store endpoints.

use serde::Serialize;

use crate::application::handlers::billing::SubscriptionPayment;
use crate::ports::PortalSession;

/// Response for `GET /store/customers/me/subscriptions/portal`.
#[derive(Debug, Clone, Serialize)]
pub struct PortalSessionResponse {
    pub portal_session: PortalSessionBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortalSessionBody {
    pub id: String,
    pub url: String,
}

impl From<PortalSession> for PortalSessionResponse {
    fn from(session: PortalSession) -> Self {
        Self {
            portal_session: PortalSessionBody {
                id: session.id,
                url: session.url,
            },
        }
    }
}

/// Response for `POST /store/carts/:id/subscription-session`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionSessionResponse {
    pub subscription_id: String,
    pub status: String,
    pub latest_invoice_id: Option<String>,
}

impl From<SubscriptionPayment> for SubscriptionSessionResponse {
    fn from(payment: SubscriptionPayment) -> Self {
        Self {
            subscription_id: payment.subscription_id.to_string(),
            status: payment.provider_subscription.status,
            latest_invoice_id: payment.provider_subscription.latest_invoice_id,
        }
    }
}
