//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Subscriptions and their items are written in one transaction; reads
//! and the listing exclude soft-deleted rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{
    DomainError, ErrorCode, SubscriptionId, SubscriptionItemId, Timestamp,
};
use crate::domain::subscription::{Subscription, SubscriptionItem};
use crate::ports::{DeleteOutcome, Pagination, SubscriptionRepository};

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<SubscriptionItem>, DomainError> {
        let rows: Vec<SubscriptionItemRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, period, metadata, created_at, updated_at, deleted_at
            FROM subscription_item
            WHERE subscription_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(subscription_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load subscription items"))?;

        rows.into_iter().map(SubscriptionItem::try_from).collect()
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    status: String,
    next_payment_at: Option<DateTime<Utc>>,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Database row representation of a subscription item.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionItemRow {
    id: String,
    subscription_id: String,
    period: Option<String>,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::parse(row.id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
            status: row.status,
            next_payment_at: row.next_payment_at.map(Timestamp::from_datetime),
            metadata: row.metadata,
            items: Vec::new(),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            deleted_at: row.deleted_at.map(Timestamp::from_datetime),
        })
    }
}

impl TryFrom<SubscriptionItemRow> for SubscriptionItem {
    type Error = DomainError;

    fn try_from(row: SubscriptionItemRow) -> Result<Self, Self::Error> {
        Ok(SubscriptionItem {
            id: SubscriptionItemId::parse(row.id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
            subscription_id: SubscriptionId::parse(row.subscription_id)
                .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?,
            period: row.period,
            metadata: row.metadata,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            deleted_at: row.deleted_at.map(Timestamp::from_datetime),
        })
    }
}

fn db_err(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO subscription (id, status, next_payment_at, metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(subscription.id.as_str())
        .bind(&subscription.status)
        .bind(subscription.next_payment_at.map(|t| t.as_datetime()))
        .bind(&subscription.metadata)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("subscription_pkey") {
                    return DomainError::new(
                        ErrorCode::Conflict,
                        format!("Subscription {} already exists", subscription.id),
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert subscription: {}", e),
            )
        })?;

        for item in &subscription.items {
            sqlx::query(
                r#"
                INSERT INTO subscription_item
                    (id, subscription_id, period, metadata, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id.as_str())
            .bind(item.subscription_id.as_str())
            .bind(&item.period)
            .bind(&item.metadata)
            .bind(item.created_at.as_datetime())
            .bind(item.updated_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to insert subscription item"))?;
        }

        tx.commit()
            .await
            .map_err(db_err("Failed to commit subscription"))?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscription SET
                status = $2,
                next_payment_at = $3,
                metadata = $4,
                updated_at = $5
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(subscription.id.as_str())
        .bind(&subscription.status)
        .bind(subscription.next_payment_at.map(|t| t.as_datetime()))
        .bind(&subscription.metadata)
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to update subscription"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::subscription_not_found(&subscription.id));
        }

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, status, next_payment_at, metadata, created_at, updated_at, deleted_at
            FROM subscription
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find subscription"))?;

        match row {
            Some(row) => {
                let mut subscription = Subscription::try_from(row)?;
                subscription.items = self.load_items(id).await?;
                Ok(Some(subscription))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, page: Pagination) -> Result<(Vec<Subscription>, u64), DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, status, next_payment_at, metadata, created_at, updated_at, deleted_at
            FROM subscription
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(page.offset as i64)
        .bind(page.limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list subscriptions"))?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscription WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(db_err("Failed to count subscriptions"))?;

        let mut subscriptions = Vec::with_capacity(rows.len());
        for row in rows {
            let mut subscription = Subscription::try_from(row)?;
            subscription.items = self.load_items(&subscription.id).await?;
            subscriptions.push(subscription);
        }

        Ok((subscriptions, count as u64))
    }

    async fn soft_delete(
        &self,
        id: &SubscriptionId,
        at: Timestamp,
    ) -> Result<DeleteOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let result = sqlx::query(
            r#"
            UPDATE subscription SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .bind(at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to soft-delete subscription"))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(db_err("Failed to roll back delete"))?;
            return Ok(DeleteOutcome::NotFound);
        }

        sqlx::query(
            r#"
            UPDATE subscription_item SET deleted_at = $2, updated_at = $2
            WHERE subscription_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_str())
        .bind(at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to soft-delete subscription items"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit delete"))?;

        Ok(DeleteOutcome::Deleted)
    }
}
