//! PostgreSQL implementation of CartService.
//!
//! Operates on the platform-owned `cart`, `line_item`, and
//! `payment_session` tables; this extension only reads carts and writes
//! the columns its migrations added.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{
    CartId, CustomerId, DomainError, ErrorCode, LineItemId, SubscriptionId, SubscriptionItemId,
    VariantId,
};
use crate::ports::{Cart, CartLineItem, CartService};

/// PostgreSQL implementation of the CartService port.
pub struct PostgresCartService {
    pool: PgPool,
}

impl PostgresCartService {
    /// Creates a new service with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: String,
    customer_id: Option<String>,
    email: Option<String>,
    currency_code: String,
    subscription_id: Option<String>,
    external_id: Option<String>,
    selected_payment_provider: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: String,
    variant_id: String,
    title: String,
    quantity: i32,
    subscription_item_id: Option<String>,
}

fn db_err(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn row_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, e.to_string())
}

#[async_trait]
impl CartService for PostgresCartService {
    async fn retrieve(&self, id: &CartId) -> Result<Option<Cart>, DomainError> {
        let row: Option<CartRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.customer_id, c.email, c.currency_code,
                   c.subscription_id, c.external_id,
                   ps.provider_id AS selected_payment_provider
            FROM cart c
            LEFT JOIN payment_session ps ON ps.cart_id = c.id AND ps.is_selected = true
            WHERE c.id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to load cart"))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows: Vec<LineItemRow> = sqlx::query_as(
            r#"
            SELECT id, variant_id, title, quantity, subscription_item_id
            FROM line_item
            WHERE cart_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load cart line items"))?;

        let mut items = Vec::with_capacity(item_rows.len());
        for item in item_rows {
            items.push(CartLineItem {
                id: LineItemId::new(item.id).map_err(row_err)?,
                variant_id: VariantId::new(item.variant_id).map_err(row_err)?,
                title: item.title,
                quantity: item.quantity,
                subscription_item_id: item
                    .subscription_item_id
                    .map(SubscriptionItemId::parse)
                    .transpose()
                    .map_err(row_err)?,
            });
        }

        Ok(Some(Cart {
            id: CartId::new(row.id).map_err(row_err)?,
            customer_id: row
                .customer_id
                .map(CustomerId::new)
                .transpose()
                .map_err(row_err)?,
            email: row.email,
            currency_code: row.currency_code,
            subscription_id: row
                .subscription_id
                .map(SubscriptionId::parse)
                .transpose()
                .map_err(row_err)?,
            external_id: row.external_id,
            selected_payment_provider: row.selected_payment_provider,
            items,
        }))
    }

    async fn link_subscription(
        &self,
        id: &CartId,
        subscription_id: &SubscriptionId,
        external_id: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE cart SET subscription_id = $2, external_id = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(subscription_id.as_str())
        .bind(external_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to link cart to subscription"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CartNotFound,
                format!("Cart {} not found", id),
            ));
        }
        Ok(())
    }

    async fn link_line_item(
        &self,
        line_item_id: &LineItemId,
        subscription_item_id: &SubscriptionItemId,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE line_item SET subscription_item_id = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(line_item_id.as_str())
        .bind(subscription_item_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to link line item"))?;

        Ok(())
    }

    async fn set_payment_session(
        &self,
        id: &CartId,
        provider_id: &str,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        sqlx::query("UPDATE payment_session SET is_selected = false WHERE cart_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to clear payment sessions"))?;

        let result = sqlx::query(
            r#"
            UPDATE payment_session SET is_selected = true
            WHERE cart_id = $1 AND provider_id = $2
            "#,
        )
        .bind(id.as_str())
        .bind(provider_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to select payment session"))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(db_err("Failed to roll back payment session"))?;
            return Err(DomainError::new(
                ErrorCode::CartNotFound,
                format!("Cart {} has no {} payment session", id, provider_id),
            ));
        }

        tx.commit()
            .await
            .map_err(db_err("Failed to commit payment session"))?;
        Ok(())
    }

    async fn authorize_payment(&self, id: &CartId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_session SET status = 'authorized'
            WHERE cart_id = $1 AND is_selected = true
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to authorize payment"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CartNotFound,
                format!("Cart {} has no selected payment session", id),
            ));
        }
        Ok(())
    }
}
