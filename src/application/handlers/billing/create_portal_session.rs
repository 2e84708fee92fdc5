//! CreatePortalSessionHandler - billing portal access for store customers.

use std::sync::Arc;

use crate::domain::foundation::CustomerId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{BillingProvider, CustomerService, PortalSession};

/// Command to open a billing portal session.
#[derive(Debug, Clone)]
pub struct CreatePortalSessionCommand {
    pub customer_id: CustomerId,
}

/// Handler that resolves the provider customer and opens a portal session.
pub struct CreatePortalSessionHandler {
    customer_service: Arc<dyn CustomerService>,
    billing_provider: Arc<dyn BillingProvider>,
    return_url: String,
}

impl CreatePortalSessionHandler {
    pub fn new(
        customer_service: Arc<dyn CustomerService>,
        billing_provider: Arc<dyn BillingProvider>,
        return_url: String,
    ) -> Self {
        Self {
            customer_service,
            billing_provider,
            return_url,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePortalSessionCommand,
    ) -> Result<PortalSession, SubscriptionError> {
        let customer = self
            .customer_service
            .retrieve(&cmd.customer_id)
            .await?
            .ok_or_else(|| {
                SubscriptionError::infrastructure(format!(
                    "customer {} not found",
                    cmd.customer_id
                ))
            })?;

        let provider_customer_id = customer.provider_customer_id.ok_or_else(|| {
            SubscriptionError::provider("customer has no billing provider account")
        })?;

        let session = self
            .billing_provider
            .create_portal_session(&provider_customer_id, &self.return_url)
            .await
            .map_err(|e| SubscriptionError::provider(e.to_string()))?;

        Ok(session)
    }
}
