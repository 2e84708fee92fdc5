//! Request authentication extractors.
//!
//! In production these would validate a JWT/session established by the
//! platform's auth middleware. For development and testing, identity is
//! taken from trusted headers set by the upstream gateway.

use crate::domain::foundation::CustomerId;

use super::error::ApiError;

/// Admin user extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub user_id: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("x-admin-user-id")
                .and_then(|v| v.to_str().ok())
                .filter(|s| !s.is_empty())
                .map(String::from)
                .ok_or_else(ApiError::unauthorized)?;

            Ok(AuthenticatedAdmin { user_id })
        })
    }
}

/// Store customer extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer {
    pub customer_id: CustomerId,
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedCustomer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let customer_id = parts
                .headers
                .get("x-customer-id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| CustomerId::new(s).ok())
                .ok_or_else(ApiError::unauthorized)?;

            Ok(AuthenticatedCustomer { customer_id })
        })
    }
}
