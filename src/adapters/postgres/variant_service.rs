//! PostgreSQL implementation of VariantService.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, VariantId};
use crate::ports::{ProductVariant, VariantService};

/// PostgreSQL implementation of the VariantService port.
pub struct PostgresVariantService {
    pool: PgPool,
}

impl PostgresVariantService {
    /// Creates a new service with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: String,
    product_id: String,
    title: String,
    is_subscription: bool,
    is_digital: bool,
    subscription_period: Option<String>,
}

#[async_trait]
impl VariantService for PostgresVariantService {
    async fn retrieve(&self, id: &VariantId) -> Result<Option<ProductVariant>, DomainError> {
        let row: Option<VariantRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, title,
                   COALESCE(is_subscription, false) AS is_subscription,
                   COALESCE(is_digital, false) AS is_digital,
                   subscription_period
            FROM product_variant
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to load product variant: {}", e),
            )
        })?;

        row.map(|row| {
            Ok(ProductVariant {
                id: VariantId::new(row.id)
                    .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
                product_id: row.product_id,
                title: row.title,
                is_subscription: row.is_subscription,
                is_digital: row.is_digital,
                subscription_period: row.subscription_period,
            })
        })
        .transpose()
    }
}
