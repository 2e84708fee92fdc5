//! Stripe billing provider adapter.
//!
//! Implements the `BillingProvider` trait against the Stripe REST API
//! using form-encoded requests with basic auth on the secret key.
//!
//! # Security
//!
//! Secrets are handled via `secrecy::SecretString`; webhook signature
//! verification lives in the domain (`StripeWebhookVerifier`), fed by the
//! webhook signing secret from this adapter's configuration.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::VariantId;
use crate::ports::{
    BillingError, BillingErrorCode, BillingProvider, CreateCustomerRequest,
    CreateProviderSubscriptionRequest, PortalSession, ProductVariant, ProviderCustomer,
    ProviderPrice, ProviderSubscription, ProviderSubscriptionLine,
};

use super::webhook_types::{
    StripeCustomer, StripeErrorEnvelope, StripeList, StripePortalSession, StripePrice,
    StripeSubscription,
};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for the Stripe API.
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Exposes the webhook signing secret for the verifier.
    pub fn webhook_secret(&self) -> String {
        self.webhook_secret.expose_secret().clone()
    }
}

/// Stripe billing provider adapter.
pub struct StripeBillingAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeBillingAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, BillingError> {
        let response = self
            .http_client
            .post(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| BillingError::network(e.to_string()))?;

        Self::parse_response(path, response).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, BillingError> {
        let response = self
            .http_client
            .get(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(query)
            .send()
            .await
            .map_err(|e| BillingError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::parse_response(path, response).await.map(Some)
    }

    async fn delete<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, BillingError> {
        let response = self
            .http_client
            .delete(self.url(path))
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| BillingError::network(e.to_string()))?;

        Self::parse_response(path, response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, BillingError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            tracing::error!(%path, %status, error = %message, "Stripe API call failed");

            let code = match status.as_u16() {
                401 | 403 => BillingErrorCode::AuthenticationError,
                404 => BillingErrorCode::NotFound,
                429 => BillingErrorCode::RateLimitExceeded,
                _ => BillingErrorCode::ProviderError,
            };
            return Err(BillingError::new(code, message));
        }

        response
            .json()
            .await
            .map_err(|e| BillingError::provider(format!("failed to parse response: {}", e)))
    }

    fn to_provider_subscription(sub: StripeSubscription) -> ProviderSubscription {
        ProviderSubscription {
            id: sub.id,
            customer_id: sub.customer.id().to_string(),
            status: sub.status,
            latest_invoice_id: sub.latest_invoice.map(|i| i.id().to_string()),
            current_period_end: sub.current_period_end,
            lines: sub
                .items
                .data
                .into_iter()
                .map(|item| ProviderSubscriptionLine {
                    period: item.price.recurring.as_ref().map(|r| r.interval.clone()),
                    price_id: item.price.id,
                    id: item.id,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl BillingProvider for StripeBillingAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<ProviderCustomer, BillingError> {
        let mut params = vec![("email".to_string(), request.email.clone())];
        if let Some(name) = &request.name {
            params.push(("name".to_string(), name.clone()));
        }
        if let Some(customer_id) = &request.customer_id {
            params.push((
                "metadata[customer_id]".to_string(),
                customer_id.to_string(),
            ));
        }

        let customer: StripeCustomer = self.post_form("/v1/customers", &params).await?;

        Ok(ProviderCustomer {
            id: customer.id,
            email: customer.email.or(Some(request.email)),
            name: customer.name.or(request.name),
            created_at: customer.created,
        })
    }

    async fn retrieve_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<ProviderCustomer>, BillingError> {
        let customer: Option<StripeCustomer> = self
            .get(&format!("/v1/customers/{}", customer_id), &[])
            .await?;

        Ok(customer.filter(|c| !c.deleted).map(|c| ProviderCustomer {
            id: c.id,
            email: c.email,
            name: c.name,
            created_at: c.created,
        }))
    }

    async fn create_subscription(
        &self,
        request: CreateProviderSubscriptionRequest,
    ) -> Result<ProviderSubscription, BillingError> {
        let mut params = vec![
            ("customer".to_string(), request.customer_id.clone()),
            (
                "payment_behavior".to_string(),
                "default_incomplete".to_string(),
            ),
            (
                "expand[]".to_string(),
                "latest_invoice".to_string(),
            ),
            ("metadata[cart_id]".to_string(), request.cart_id.clone()),
        ];
        for (i, price_id) in request.price_ids.iter().enumerate() {
            params.push((format!("items[{}][price]", i), price_id.clone()));
        }

        let subscription: StripeSubscription =
            self.post_form("/v1/subscriptions", &params).await?;

        Ok(Self::to_provider_subscription(subscription))
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderSubscription>, BillingError> {
        let subscription: Option<StripeSubscription> = self
            .get(&format!("/v1/subscriptions/{}", subscription_id), &[])
            .await?;

        Ok(subscription.map(Self::to_provider_subscription))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<ProviderSubscription, BillingError> {
        let subscription: StripeSubscription = self
            .delete(&format!("/v1/subscriptions/{}", subscription_id))
            .await?;

        Ok(Self::to_provider_subscription(subscription))
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, BillingError> {
        let params = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];

        let session: StripePortalSession = self
            .post_form("/v1/billing_portal/sessions", &params)
            .await?;

        Ok(PortalSession {
            id: session.id,
            url: session.url,
        })
    }

    async fn update_invoice_metadata(
        &self,
        invoice_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), BillingError> {
        let params = vec![(format!("metadata[{}]", key), value.to_string())];

        let _: serde_json::Value = self
            .post_form(&format!("/v1/invoices/{}", invoice_id), &params)
            .await?;
        Ok(())
    }

    async fn find_price_for_product(
        &self,
        product_id: &str,
        currency: &str,
    ) -> Result<Option<ProviderPrice>, BillingError> {
        let prices: Option<StripeList<StripePrice>> = self
            .get(
                "/v1/prices",
                &[
                    ("product", product_id),
                    ("currency", currency),
                    ("active", "true"),
                    ("limit", "1"),
                ],
            )
            .await?;

        Ok(prices.and_then(|list| list.data.into_iter().next()).map(
            |price| ProviderPrice {
                interval: price.recurring.as_ref().map(|r| r.interval.clone()),
                currency: price.currency,
                id: price.id,
            },
        ))
    }

    async fn create_product(&self, variant: &ProductVariant) -> Result<(), BillingError> {
        let params = vec![
            ("id".to_string(), variant.id.to_string()),
            ("name".to_string(), variant.title.clone()),
            (
                "metadata[subscription_period]".to_string(),
                variant.subscription_period.clone().unwrap_or_default(),
            ),
        ];

        let _: serde_json::Value = self.post_form("/v1/products", &params).await?;
        Ok(())
    }

    async fn update_product(&self, variant: &ProductVariant) -> Result<(), BillingError> {
        let params = vec![
            ("name".to_string(), variant.title.clone()),
            (
                "metadata[subscription_period]".to_string(),
                variant.subscription_period.clone().unwrap_or_default(),
            ),
        ];

        let _: serde_json::Value = self
            .post_form(&format!("/v1/products/{}", variant.id), &params)
            .await?;
        Ok(())
    }

    async fn delete_product(&self, variant_id: &VariantId) -> Result<(), BillingError> {
        let _: serde_json::Value = self
            .delete(&format!("/v1/products/{}", variant_id))
            .await?;
        Ok(())
    }
}
