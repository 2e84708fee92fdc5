//! Error type for subscription operations.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors raised by subscription command/query handlers.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Subscription {0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Billing provider error: {0}")]
    Provider(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure(message.into())
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SubscriptionNotFound => Self::NotFound(err.message),
            ErrorCode::ValidationFailed | ErrorCode::InvalidFormat => {
                Self::Validation(ValidationError::invalid_format("request", err.message))
            }
            ErrorCode::PaymentRequired | ErrorCode::ExternalServiceError => {
                Self::Provider(err.message)
            }
            _ => Self::Infrastructure(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_domain_error_maps_to_not_found() {
        let err: SubscriptionError = DomainError::subscription_not_found("sub_x").into();
        assert!(matches!(err, SubscriptionError::NotFound(_)));
    }

    #[test]
    fn database_error_maps_to_infrastructure() {
        let err: SubscriptionError =
            DomainError::new(ErrorCode::DatabaseError, "connection lost").into();
        assert!(matches!(err, SubscriptionError::Infrastructure(_)));
    }
}
