//! Inventory store collaborators
//!
//! The allocator reads and writes warehouse state only through
//! [`InventoryStore`]. Two implementations are provided: PostgreSQL for
//! deployments and an in-memory store seeded from CSV exports of the
//! inventory worksheets.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    MovementRecord, OrderLineRecord, OrderStatus, Product, ProductionOrder, ProductionStatus,
    StockEntry, Tier,
};

mod memory;
mod postgres;
mod seed;

pub use memory::MemoryStore;
pub use postgres::PgInventoryStore;
pub use seed::{load_seed_dir, SeedData};

/// Failures reported by a store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Seed data error: {0}")]
    Seed(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a guarded stock decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    Applied { remaining: i64 },
    /// The cell held less than requested and was left untouched; a missing
    /// row reports zero
    Insufficient { on_hand: i64 },
}

/// Warehouse, catalog and ledger access used by the order pipeline
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Full read of one warehouse tier
    async fn read_inventory(&self, tier: Tier) -> StoreResult<Vec<StockEntry>>;

    async fn read_product_catalog(&self) -> StoreResult<Vec<Product>>;

    /// Current quantity of one stock cell, `None` if the row does not exist
    async fn stock_quantity(&self, tier: Tier, product_code: &str) -> StoreResult<Option<i64>>;

    /// Overwrite the quantity of an existing cell
    async fn update_stock_quantity(
        &self,
        tier: Tier,
        product_code: &str,
        new_quantity: i64,
    ) -> StoreResult<()>;

    /// Take `quantity` units from a cell only if it still holds them. The
    /// check and the write are one atomic step.
    async fn decrement_stock(
        &self,
        tier: Tier,
        product_code: &str,
        quantity: i64,
    ) -> StoreResult<StockDecrement>;

    async fn append_movement(&self, record: &MovementRecord) -> StoreResult<()>;

    async fn append_production_order(&self, order: &ProductionOrder) -> StoreResult<()>;

    async fn append_order_line(&self, record: &OrderLineRecord) -> StoreResult<()>;

    async fn read_movements(&self) -> StoreResult<Vec<MovementRecord>>;

    async fn read_production_orders(&self) -> StoreResult<Vec<ProductionOrder>>;

    /// Move a production order from `from` to `to`. Returns `false` when the
    /// order is no longer in `from`.
    async fn update_production_status(
        &self,
        id: Uuid,
        from: ProductionStatus,
        to: ProductionStatus,
    ) -> StoreResult<bool>;

    async fn read_order_lines(&self) -> StoreResult<Vec<OrderLineRecord>>;

    /// Move every audit row of an order still in `from` to `to`, returning
    /// how many changed
    async fn update_order_status(
        &self,
        order_reference: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<u64>;

    async fn ping(&self) -> StoreResult<()>;
}
