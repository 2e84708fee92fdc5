//! PostgreSQL implementation of OrderService.
//!
//! Operates on the platform-owned `order` table (quoted, reserved word).

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CartId, DomainError, ErrorCode, OrderId};
use crate::ports::{Order, OrderService, OrderStatus, PaymentStatus};

/// PostgreSQL implementation of the OrderService port.
pub struct PostgresOrderService {
    pool: PgPool,
}

impl PostgresOrderService {
    /// Creates a new service with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    cart_id: String,
    status: String,
    payment_status: String,
    external_id: Option<String>,
}

fn parse_order_status(s: &str) -> OrderStatus {
    match s {
        "completed" => OrderStatus::Completed,
        "canceled" => OrderStatus::Canceled,
        _ => OrderStatus::Pending,
    }
}

fn parse_payment_status(s: &str) -> PaymentStatus {
    match s {
        "awaiting" => PaymentStatus::Awaiting,
        "authorized" => PaymentStatus::Authorized,
        "captured" => PaymentStatus::Captured,
        _ => PaymentStatus::NotPaid,
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let to_db_err =
            |e: crate::domain::foundation::ValidationError| -> DomainError {
                DomainError::new(ErrorCode::DatabaseError, e.to_string())
            };
        Ok(Order {
            id: OrderId::new(row.id).map_err(to_db_err)?,
            cart_id: CartId::new(row.cart_id).map_err(to_db_err)?,
            status: parse_order_status(&row.status),
            payment_status: parse_payment_status(&row.payment_status),
            external_id: row.external_id,
        })
    }
}

fn db_err(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl OrderService for PostgresOrderService {
    async fn retrieve_by_cart_id(&self, cart_id: &CartId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, cart_id, status, payment_status, external_id
            FROM "order"
            WHERE cart_id = $1
            "#,
        )
        .bind(cart_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find order by cart"))?;

        row.map(Order::try_from).transpose()
    }

    async fn create_from_cart(&self, cart_id: &CartId) -> Result<Order, DomainError> {
        let order_id = format!("order_{}", Uuid::new_v4().simple());

        let row: OrderRow = sqlx::query_as(
            r#"
            INSERT INTO "order"
                (id, cart_id, customer_id, email, currency_code, status, payment_status,
                 created_at, updated_at)
            SELECT $1, c.id, c.customer_id, c.email, c.currency_code,
                   'pending', 'authorized', now(), now()
            FROM cart c
            WHERE c.id = $2
            RETURNING id, cart_id, status, payment_status, external_id
            "#,
        )
        .bind(&order_id)
        .bind(cart_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to create order from cart"))?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::CartNotFound,
                format!("Cart {} not found", cart_id),
            )
        })?;

        Order::try_from(row)
    }

    async fn capture_payment(&self, id: &OrderId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE "order" SET payment_status = 'captured', updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to capture order payment"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order {} not found", id),
            ));
        }
        Ok(())
    }

    async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE "order" SET status = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to update order status"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order {} not found", id),
            ));
        }
        Ok(())
    }

    async fn set_external_id(&self, id: &OrderId, external_id: &str) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE "order" SET external_id = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(external_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to set order external id"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order {} not found", id),
            ));
        }
        Ok(())
    }
}
