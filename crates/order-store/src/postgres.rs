use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::{Order, OrderStatus};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Result, StoreError, store::OrderStore};

/// PostgreSQL-backed order store implementation.
///
/// Each order is stored as one row: the full document as JSONB plus
/// the columns the store filters and guards on (customer, assigned
/// agent, status, creation time). The conditional update compiles to a
/// single `UPDATE ... WHERE id = $1 AND status = $2`, so the
/// read-modify-write guard is enforced by the database.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the orders table and its indexes if they do not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY,
                customer_id UUID NOT NULL,
                delivery_staff UUID,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                doc JSONB NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_orders_customer
                ON orders (customer_id, created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_orders_staff
                ON orders (delivery_staff, created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_orders_status
                ON orders (status);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let doc: serde_json::Value = row.try_get("doc")?;
        Ok(serde_json::from_value(doc)?)
    }

    fn parse_status(order_id: OrderId, status: &str) -> Result<OrderStatus> {
        status.parse().map_err(|_| StoreError::InvalidStatus {
            order_id,
            status: status.to_string(),
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let doc = serde_json::to_value(order)?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, delivery_staff, status, created_at, doc)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.customer().as_uuid())
        .bind(order.delivery_staff().map(|s| s.as_uuid()))
        .bind(order.status().as_str())
        .bind(order.created_at())
        .bind(doc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(order.id()));
        }
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Order> {
        let row: Option<PgRow> = sqlx::query("SELECT doc FROM orders WHERE id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(StoreError::NotFound(order_id)),
        }
    }

    async fn update_expecting(&self, order: &Order, expected: OrderStatus) -> Result<()> {
        let doc = serde_json::to_value(order)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET delivery_staff = $3, status = $4, doc = $5
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(expected.as_str())
        .bind(order.delivery_staff().map(|s| s.as_uuid()))
        .bind(order.status().as_str())
        .bind(doc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // The guard did not match; find out why.
        let actual: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(order.id().as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match actual {
            Some(status) => Err(StoreError::Conflict {
                order_id: order.id(),
                expected,
                actual: Self::parse_status(order.id(), &status)?,
            }),
            None => Err(StoreError::NotFound(order.id())),
        }
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT doc FROM orders ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_for_customer(&self, customer: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT doc FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_for_staff(&self, staff: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT doc FROM orders WHERE delivery_staff = $1 ORDER BY created_at DESC",
        )
        .bind(staff.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }
}
