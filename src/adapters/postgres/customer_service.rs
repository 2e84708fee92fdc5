//! PostgreSQL implementation of CustomerService.
//!
//! The provider customer id lives under the `stripe_id` key of the
//! customer's metadata jsonb, matching the platform's convention for
//! gateway references.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{CustomerId, DomainError, ErrorCode};
use crate::ports::{Customer, CustomerService};

/// PostgreSQL implementation of the CustomerService port.
pub struct PostgresCustomerService {
    pool: PgPool,
}

impl PostgresCustomerService {
    /// Creates a new service with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    email: String,
    name: Option<String>,
    provider_customer_id: Option<String>,
}

#[async_trait]
impl CustomerService for PostgresCustomerService {
    async fn retrieve(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r#"
            SELECT id, email,
                   NULLIF(TRIM(CONCAT(first_name, ' ', last_name)), '') AS name,
                   metadata->>'stripe_id' AS provider_customer_id
            FROM customer
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to load customer: {}", e),
            )
        })?;

        row.map(|row| {
            Ok(Customer {
                id: CustomerId::new(row.id)
                    .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
                email: row.email,
                name: row.name,
                provider_customer_id: row.provider_customer_id,
            })
        })
        .transpose()
    }

    async fn set_provider_customer_id(
        &self,
        id: &CustomerId,
        provider_customer_id: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE customer
            SET metadata = jsonb_set(COALESCE(metadata, '{}'::jsonb), '{stripe_id}', to_jsonb($2::text)),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(provider_customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to link provider customer: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CustomerNotFound,
                format!("Customer {} not found", id),
            ));
        }
        Ok(())
    }
}
