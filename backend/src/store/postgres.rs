//! PostgreSQL inventory store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{InventoryStore, StockDecrement, StoreError, StoreResult};
use crate::models::{
    Direction, LineSource, MovementRecord, OrderLineRecord, OrderStatus, Product,
    ProductionKind, ProductionOrder, ProductionStatus, StockEntry, Tier,
};

/// Inventory store backed by the `products`, `stock_entries`, `movements`,
/// `production_orders` and `order_lines` tables
#[derive(Clone)]
pub struct PgInventoryStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct StockRow {
    tier: String,
    product_code: String,
    description: String,
    quantity: i64,
}

#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    occurred_at: DateTime<Utc>,
    product_code: String,
    direction: String,
    quantity: i64,
    tier: String,
    user_name: String,
    order_reference: String,
}

#[derive(Debug, FromRow)]
struct ProductionOrderRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    product_code: String,
    source_code: Option<String>,
    base_key: String,
    description: String,
    quantity: i64,
    requested_by: String,
    order_reference: String,
    kind: String,
    status: String,
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    order_reference: String,
    customer: String,
    requested_by: String,
    created_at: DateTime<Utc>,
    line_index: i32,
    product_code: String,
    description: String,
    source: String,
    quantity: i64,
    status: String,
}

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::CorruptRow(format!("unexpected {} value {:?}", column, value))
}

impl TryFrom<StockRow> for StockEntry {
    type Error = StoreError;

    fn try_from(row: StockRow) -> StoreResult<Self> {
        let tier = Tier::from_str(&row.tier).ok_or_else(|| corrupt("tier", &row.tier))?;
        Ok(StockEntry::new(tier, row.product_code, row.description, row.quantity))
    }
}

impl TryFrom<MovementRow> for MovementRecord {
    type Error = StoreError;

    fn try_from(row: MovementRow) -> StoreResult<Self> {
        Ok(MovementRecord {
            id: row.id,
            occurred_at: row.occurred_at,
            direction: Direction::from_str(&row.direction)
                .ok_or_else(|| corrupt("direction", &row.direction))?,
            tier: Tier::from_str(&row.tier).ok_or_else(|| corrupt("tier", &row.tier))?,
            product_code: row.product_code,
            quantity: row.quantity,
            user: row.user_name,
            order_reference: row.order_reference,
        })
    }
}

impl TryFrom<ProductionOrderRow> for ProductionOrder {
    type Error = StoreError;

    fn try_from(row: ProductionOrderRow) -> StoreResult<Self> {
        Ok(ProductionOrder {
            id: row.id,
            created_at: row.created_at,
            kind: ProductionKind::from_str(&row.kind).ok_or_else(|| corrupt("kind", &row.kind))?,
            status: ProductionStatus::from_str(&row.status)
                .ok_or_else(|| corrupt("status", &row.status))?,
            product_code: row.product_code,
            source_code: row.source_code,
            base_key: row.base_key,
            description: row.description,
            quantity: row.quantity,
            requested_by: row.requested_by,
            order_reference: row.order_reference,
        })
    }
}

impl TryFrom<OrderLineRow> for OrderLineRecord {
    type Error = StoreError;

    fn try_from(row: OrderLineRow) -> StoreResult<Self> {
        Ok(OrderLineRecord {
            id: row.id,
            order_id: row.order_id,
            source: LineSource::from_str(&row.source)
                .ok_or_else(|| corrupt("source", &row.source))?,
            status: OrderStatus::from_str(&row.status)
                .ok_or_else(|| corrupt("status", &row.status))?,
            order_reference: row.order_reference,
            customer: row.customer,
            requested_by: row.requested_by,
            created_at: row.created_at,
            line_index: row.line_index,
            product_code: row.product_code,
            description: row.description,
            quantity: row.quantity,
        })
    }
}

impl PgInventoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn read_inventory(&self, tier: Tier) -> StoreResult<Vec<StockEntry>> {
        let rows = sqlx::query_as::<_, StockRow>(
            r#"
            SELECT tier, product_code, description, quantity
            FROM stock_entries
            WHERE tier = $1
            ORDER BY product_code
            "#,
        )
        .bind(tier.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockEntry::try_from).collect()
    }

    async fn read_product_catalog(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT code, description FROM products ORDER BY code",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, description)| Product { code, description })
            .collect())
    }

    async fn stock_quantity(&self, tier: Tier, product_code: &str) -> StoreResult<Option<i64>> {
        let quantity = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM stock_entries WHERE tier = $1 AND product_code = $2",
        )
        .bind(tier.as_str())
        .bind(product_code)
        .fetch_optional(&self.db)
        .await?;

        Ok(quantity)
    }

    async fn update_stock_quantity(
        &self,
        tier: Tier,
        product_code: &str,
        new_quantity: i64,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE stock_entries
            SET quantity = $1, updated_at = NOW()
            WHERE tier = $2 AND product_code = $3
            "#,
        )
        .bind(new_quantity)
        .bind(tier.as_str())
        .bind(product_code)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "{} stock for {}",
                tier, product_code
            )));
        }

        Ok(())
    }

    async fn decrement_stock(
        &self,
        tier: Tier,
        product_code: &str,
        quantity: i64,
    ) -> StoreResult<StockDecrement> {
        let remaining = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE stock_entries
            SET quantity = quantity - $1, updated_at = NOW()
            WHERE tier = $2 AND product_code = $3 AND quantity >= $1
            RETURNING quantity
            "#,
        )
        .bind(quantity)
        .bind(tier.as_str())
        .bind(product_code)
        .fetch_optional(&self.db)
        .await?;

        match remaining {
            Some(remaining) => Ok(StockDecrement::Applied { remaining }),
            None => {
                let on_hand = self.stock_quantity(tier, product_code).await?.unwrap_or(0);
                Ok(StockDecrement::Insufficient { on_hand })
            }
        }
    }

    async fn append_movement(&self, record: &MovementRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO movements (
                id, occurred_at, product_code, direction, quantity, tier, user_name, order_reference
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.occurred_at)
        .bind(&record.product_code)
        .bind(record.direction.as_str())
        .bind(record.quantity)
        .bind(record.tier.as_str())
        .bind(&record.user)
        .bind(&record.order_reference)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn append_production_order(&self, order: &ProductionOrder) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO production_orders (
                id, created_at, product_code, source_code, base_key, description, quantity,
                requested_by, order_reference, kind, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id)
        .bind(order.created_at)
        .bind(&order.product_code)
        .bind(&order.source_code)
        .bind(&order.base_key)
        .bind(&order.description)
        .bind(order.quantity)
        .bind(&order.requested_by)
        .bind(&order.order_reference)
        .bind(order.kind.as_str())
        .bind(order.status.as_str())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn append_order_line(&self, record: &OrderLineRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_lines (
                id, order_id, order_reference, customer, requested_by, created_at, line_index,
                product_code, description, source, quantity, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id)
        .bind(record.order_id)
        .bind(&record.order_reference)
        .bind(&record.customer)
        .bind(&record.requested_by)
        .bind(record.created_at)
        .bind(record.line_index)
        .bind(&record.product_code)
        .bind(&record.description)
        .bind(record.source.as_str())
        .bind(record.quantity)
        .bind(record.status.as_str())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn read_movements(&self) -> StoreResult<Vec<MovementRecord>> {
        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, occurred_at, product_code, direction, quantity, tier, user_name,
                   order_reference
            FROM movements
            ORDER BY occurred_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(MovementRecord::try_from).collect()
    }

    async fn read_production_orders(&self) -> StoreResult<Vec<ProductionOrder>> {
        let rows = sqlx::query_as::<_, ProductionOrderRow>(
            r#"
            SELECT id, created_at, product_code, source_code, base_key, description, quantity,
                   requested_by, order_reference, kind, status
            FROM production_orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProductionOrder::try_from).collect()
    }

    async fn update_production_status(
        &self,
        id: Uuid,
        from: ProductionStatus,
        to: ProductionStatus,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE production_orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            "#,
        )
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(&self.db)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM production_orders WHERE id = $1")
                .bind(id)
                .fetch_one(&self.db)
                .await?;
        if exists == 0 {
            return Err(StoreError::NotFound(format!("production order {}", id)));
        }

        Ok(false)
    }

    async fn read_order_lines(&self) -> StoreResult<Vec<OrderLineRecord>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT id, order_id, order_reference, customer, requested_by, created_at, line_index,
                   product_code, description, source, quantity, status
            FROM order_lines
            ORDER BY created_at DESC, line_index
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(OrderLineRecord::try_from).collect()
    }

    async fn update_order_status(
        &self,
        order_reference: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE order_lines SET status = $1 WHERE order_reference = $2 AND status = $3",
        )
        .bind(to.as_str())
        .bind(order_reference)
        .bind(from.as_str())
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
