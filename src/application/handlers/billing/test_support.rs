//! Shared mocks for billing handler tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::foundation::{CustomerId, DomainError, VariantId};
use crate::ports::{
    BillingError, BillingProvider, CreateCustomerRequest, CreateProviderSubscriptionRequest,
    Customer, CustomerService, PortalSession, ProductVariant, ProviderCustomer, ProviderPrice,
    ProviderSubscription, ProviderSubscriptionLine,
};

/// Customer service backed by an optional single customer.
pub struct MockCustomerService {
    customer: Mutex<Option<Customer>>,
}

impl MockCustomerService {
    pub fn empty() -> Self {
        Self {
            customer: Mutex::new(None),
        }
    }

    pub fn with_customer(customer: Customer) -> Self {
        Self {
            customer: Mutex::new(Some(customer)),
        }
    }

    pub fn linked_provider_id(&self) -> Option<String> {
        self.customer
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|c| c.provider_customer_id.clone())
    }
}

#[async_trait]
impl CustomerService for MockCustomerService {
    async fn retrieve(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError> {
        Ok(self
            .customer
            .lock()
            .unwrap()
            .clone()
            .filter(|c| &c.id == id))
    }

    async fn set_provider_customer_id(
        &self,
        id: &CustomerId,
        provider_customer_id: &str,
    ) -> Result<(), DomainError> {
        let mut customer = self.customer.lock().unwrap();
        if let Some(c) = customer.as_mut().filter(|c| &c.id == id) {
            c.provider_customer_id = Some(provider_customer_id.to_string());
        }
        Ok(())
    }
}

/// Canned-response billing provider that records subscription requests.
pub struct MockBillingProvider {
    pub subscription_requests: Mutex<Vec<CreateProviderSubscriptionRequest>>,
    pub invoice_metadata: Mutex<Vec<(String, String, String)>>,
}

impl MockBillingProvider {
    pub fn new() -> Self {
        Self {
            subscription_requests: Mutex::new(Vec::new()),
            invoice_metadata: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BillingProvider for MockBillingProvider {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<ProviderCustomer, BillingError> {
        Ok(ProviderCustomer {
            id: "cus_mock".to_string(),
            email: Some(request.email),
            name: request.name,
            created_at: 1704067200,
        })
    }

    async fn retrieve_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<ProviderCustomer>, BillingError> {
        Ok(Some(ProviderCustomer {
            id: customer_id.to_string(),
            email: None,
            name: None,
            created_at: 1704067200,
        }))
    }

    async fn create_subscription(
        &self,
        request: CreateProviderSubscriptionRequest,
    ) -> Result<ProviderSubscription, BillingError> {
        let lines = request
            .price_ids
            .iter()
            .enumerate()
            .map(|(i, price_id)| ProviderSubscriptionLine {
                id: format!("si_mock_{}", i),
                price_id: price_id.clone(),
                period: Some("month".to_string()),
            })
            .collect();
        self.subscription_requests.lock().unwrap().push(request);

        Ok(ProviderSubscription {
            id: "sub_mock123".to_string(),
            customer_id: "cus_mock".to_string(),
            status: "incomplete".to_string(),
            latest_invoice_id: Some("in_mock123".to_string()),
            current_period_end: Some(1735689600),
            lines,
        })
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderSubscription>, BillingError> {
        Ok(Some(ProviderSubscription {
            id: subscription_id.to_string(),
            customer_id: "cus_mock".to_string(),
            status: "active".to_string(),
            latest_invoice_id: None,
            current_period_end: Some(1735689600),
            lines: vec![],
        }))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, BillingError> {
        Ok(ProviderSubscription {
            id: subscription_id.to_string(),
            customer_id: "cus_mock".to_string(),
            status: "canceled".to_string(),
            latest_invoice_id: None,
            current_period_end: None,
            lines: vec![],
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        Ok(PortalSession {
            id: format!("bps_mock_{}", customer_id),
            url: format!("https://billing.example.com/p/session?return={}", return_url),
        })
    }

    async fn update_invoice_metadata(
        &self,
        invoice_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BillingError> {
        self.invoice_metadata.lock().unwrap().push((
            invoice_id.to_string(),
            key.to_string(),
            value.to_string(),
        ));
        Ok(())
    }

    async fn find_price_for_product(
        &self,
        product_id: &str,
        currency: &str,
    ) -> Result<Option<ProviderPrice>, BillingError> {
        Ok(Some(ProviderPrice {
            id: format!("price_{}", product_id),
            currency: currency.to_string(),
            interval: Some("month".to_string()),
        }))
    }

    async fn create_product(&self, _variant: &ProductVariant) -> Result<(), BillingError> {
        Ok(())
    }

    async fn update_product(&self, _variant: &ProductVariant) -> Result<(), BillingError> {
        Ok(())
    }

    async fn delete_product(&self, _variant_id: &VariantId) -> Result<(), BillingError> {
        Ok(())
    }
}
