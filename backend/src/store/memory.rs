//! In-memory inventory store
//!
//! Backs development runs (seeded from CSV) and the test suites.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{InventoryStore, SeedData, StockDecrement, StoreError, StoreResult};
use crate::models::{
    MovementRecord, OrderLineRecord, OrderStatus, Product, ProductionOrder, ProductionStatus,
    StockEntry, Tier,
};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<String, Product>,
    stock: BTreeMap<(Tier, String), StockEntry>,
    movements: Vec<MovementRecord>,
    production_orders: Vec<ProductionOrder>,
    order_lines: Vec<OrderLineRecord>,
}

/// Inventory store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Build a store from catalog and stock rows. Stock rows sharing a tier
    /// and code are merged.
    pub fn new(products: Vec<Product>, stock: Vec<StockEntry>) -> Self {
        let mut tables = Tables::default();
        for product in products {
            tables.products.insert(product.code.clone(), product);
        }
        for entry in stock {
            let key = (entry.tier, entry.product_code.clone());
            match tables.stock.get_mut(&key) {
                Some(existing) => existing.quantity += entry.quantity,
                None => {
                    tables.stock.insert(key, entry);
                }
            }
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub fn from_seed(seed: SeedData) -> Self {
        Self::new(seed.products, seed.stock)
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn read_inventory(&self, tier: Tier) -> StoreResult<Vec<StockEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .stock
            .values()
            .filter(|e| e.tier == tier)
            .cloned()
            .collect())
    }

    async fn read_product_catalog(&self) -> StoreResult<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn stock_quantity(&self, tier: Tier, product_code: &str) -> StoreResult<Option<i64>> {
        let tables = self.tables.read().await;
        Ok(tables
            .stock
            .get(&(tier, product_code.to_string()))
            .map(|e| e.quantity))
    }

    async fn update_stock_quantity(
        &self,
        tier: Tier,
        product_code: &str,
        new_quantity: i64,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .stock
            .get_mut(&(tier, product_code.to_string()))
            .ok_or_else(|| StoreError::NotFound(format!("{} stock for {}", tier, product_code)))?;
        entry.quantity = new_quantity;
        Ok(())
    }

    async fn decrement_stock(
        &self,
        tier: Tier,
        product_code: &str,
        quantity: i64,
    ) -> StoreResult<StockDecrement> {
        let mut tables = self.tables.write().await;
        let Some(entry) = tables.stock.get_mut(&(tier, product_code.to_string())) else {
            return Ok(StockDecrement::Insufficient { on_hand: 0 });
        };
        if entry.quantity < quantity {
            return Ok(StockDecrement::Insufficient {
                on_hand: entry.quantity,
            });
        }
        entry.quantity -= quantity;
        Ok(StockDecrement::Applied {
            remaining: entry.quantity,
        })
    }

    async fn append_movement(&self, record: &MovementRecord) -> StoreResult<()> {
        self.tables.write().await.movements.push(record.clone());
        Ok(())
    }

    async fn append_production_order(&self, order: &ProductionOrder) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .production_orders
            .push(order.clone());
        Ok(())
    }

    async fn append_order_line(&self, record: &OrderLineRecord) -> StoreResult<()> {
        self.tables.write().await.order_lines.push(record.clone());
        Ok(())
    }

    async fn read_movements(&self) -> StoreResult<Vec<MovementRecord>> {
        Ok(self.tables.read().await.movements.clone())
    }

    async fn read_production_orders(&self) -> StoreResult<Vec<ProductionOrder>> {
        Ok(self.tables.read().await.production_orders.clone())
    }

    async fn update_production_status(
        &self,
        id: Uuid,
        from: ProductionStatus,
        to: ProductionStatus,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let order = tables
            .production_orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("production order {}", id)))?;
        if order.status != from {
            return Ok(false);
        }
        order.status = to;
        Ok(true)
    }

    async fn read_order_lines(&self) -> StoreResult<Vec<OrderLineRecord>> {
        Ok(self.tables.read().await.order_lines.clone())
    }

    async fn update_order_status(
        &self,
        order_reference: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for line in tables
            .order_lines
            .iter_mut()
            .filter(|l| l.order_reference == order_reference && l.status == from)
        {
            line.status = to;
            changed += 1;
        }
        Ok(changed)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
