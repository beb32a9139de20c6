//! Inventory views: tier listings, dashboard totals, stock alerts

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Product, ProductCatalog, StockEntry, Tier};
use crate::store::InventoryStore;

/// Inventory service for read-only stock reporting
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

/// Filters for a tier listing
#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    /// Case-insensitive substring of code or description
    pub q: Option<String>,
    pub min_quantity: Option<i64>,
}

const MAX_LOW_STOCK_THRESHOLD: i64 = 1_000;
const MAX_STALE_DAYS: i64 = 365;
const MAX_TOP_N: usize = 100;

/// Per-view overrides of the configured reporting parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReportingQuery {
    pub threshold: Option<i64>,
    pub days: Option<i64>,
    pub top: Option<usize>,
}

impl ReportingQuery {
    pub fn low_stock_threshold(&self, default: i64) -> AppResult<i64> {
        let threshold = self.threshold.unwrap_or(default);
        check_range("threshold", threshold, 1, MAX_LOW_STOCK_THRESHOLD)?;
        Ok(threshold)
    }

    pub fn stale_after_days(&self, default: i64) -> AppResult<i64> {
        let days = self.days.unwrap_or(default);
        check_range("days", days, 1, MAX_STALE_DAYS)?;
        Ok(days)
    }

    pub fn top_n(&self, default: usize) -> AppResult<usize> {
        let top = self.top.unwrap_or(default);
        check_range("top", top as i64, 1, MAX_TOP_N as i64)?;
        Ok(top)
    }
}

fn check_range(field: &str, value: i64, min: i64, max: i64) -> AppResult<()> {
    if value < min || value > max {
        return Err(AppError::Validation {
            field: field.to_string(),
            message: format!("{} must be between {} and {}", field, min, max),
            message_es: format!("{} debe estar entre {} y {}", field, min, max),
        });
    }
    Ok(())
}

/// Physical count entered by an operator
#[derive(Debug, Deserialize)]
pub struct StockCountInput {
    pub quantity: i64,
}

/// Totals for one warehouse tier
#[derive(Debug, Clone, Serialize)]
pub struct TierSummary {
    pub tier: Tier,
    pub product_count: usize,
    pub total_units: i64,
    pub top: Vec<StockEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryDashboard {
    pub tiers: Vec<TierSummary>,
}

/// A stock row that has not moved recently
#[derive(Debug, Clone, Serialize)]
pub struct StaleStock {
    #[serde(flatten)]
    pub entry: StockEntry,
    pub last_movement: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryAlerts {
    pub low_stock_threshold: i64,
    pub stale_after_days: i64,
    pub low_stock: Vec<StockEntry>,
    pub stale: Vec<StaleStock>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// List one tier, filtered and sorted by description
    pub async fn list_tier(&self, tier: Tier, query: &InventoryQuery) -> AppResult<Vec<StockEntry>> {
        let needle = query
            .q
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();

        let mut entries: Vec<StockEntry> = self
            .store
            .read_inventory(tier)
            .await?
            .into_iter()
            .filter(|e| {
                needle.is_empty()
                    || e.product_code.to_lowercase().contains(&needle)
                    || e.description.to_lowercase().contains(&needle)
            })
            .filter(|e| query.min_quantity.map_or(true, |min| e.quantity >= min))
            .collect();
        entries.sort_by(|a, b| a.description.cmp(&b.description));

        Ok(entries)
    }

    /// Product count, unit total and the `top_n` largest rows per tier
    pub async fn dashboard(&self, top_n: usize) -> AppResult<InventoryDashboard> {
        let mut tiers = Vec::with_capacity(Tier::ALL.len());

        for tier in Tier::ALL {
            let mut entries = self.store.read_inventory(tier).await?;
            let total_units = entries.iter().map(|e| e.quantity.max(0)).sum();
            let product_count = entries.len();

            entries.sort_by(|a, b| {
                b.quantity
                    .cmp(&a.quantity)
                    .then_with(|| a.description.cmp(&b.description))
            });
            entries.truncate(top_n);

            tiers.push(TierSummary {
                tier,
                product_count,
                total_units,
                top: entries,
            });
        }

        Ok(InventoryDashboard { tiers })
    }

    /// Rows at or below the low-stock threshold, and stocked rows with no
    /// movement in the last `stale_after_days` days
    pub async fn alerts(
        &self,
        low_stock_threshold: i64,
        stale_after_days: i64,
        now: DateTime<Utc>,
    ) -> AppResult<InventoryAlerts> {
        let mut last_moved: HashMap<(Tier, String), DateTime<Utc>> = HashMap::new();
        for movement in self.store.read_movements().await? {
            let key = (movement.tier, movement.product_code);
            let latest = last_moved.entry(key).or_insert(movement.occurred_at);
            if movement.occurred_at > *latest {
                *latest = movement.occurred_at;
            }
        }

        let cutoff = now - Duration::days(stale_after_days);
        let mut low_stock = Vec::new();
        let mut stale = Vec::new();

        for tier in Tier::ALL {
            for entry in self.store.read_inventory(tier).await? {
                let last_movement = last_moved
                    .get(&(entry.tier, entry.product_code.clone()))
                    .copied();

                if entry.quantity > 0 && last_movement.map_or(true, |at| at < cutoff) {
                    stale.push(StaleStock {
                        entry: entry.clone(),
                        last_movement,
                    });
                }
                if entry.quantity <= low_stock_threshold {
                    low_stock.push(entry);
                }
            }
        }

        low_stock.sort_by(|a, b| a.quantity.cmp(&b.quantity));

        Ok(InventoryAlerts {
            low_stock_threshold,
            stale_after_days,
            low_stock,
            stale,
        })
    }

    /// Overwrite one stock cell with a physical count
    pub async fn record_count(
        &self,
        tier: Tier,
        product_code: &str,
        quantity: i64,
    ) -> AppResult<()> {
        if quantity < 0 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Counted quantity cannot be negative".to_string(),
                message_es: "La cantidad contada no puede ser negativa".to_string(),
            });
        }

        self.store
            .update_stock_quantity(tier, product_code, quantity)
            .await?;
        tracing::info!("{} stock for {} counted at {}", tier, product_code, quantity);
        Ok(())
    }

    /// Catalog search by code or description
    pub async fn search_products(&self, term: &str) -> AppResult<Vec<Product>> {
        let catalog = ProductCatalog::new(self.store.read_product_catalog().await?);
        Ok(catalog.search(term).into_iter().cloned().collect())
    }
}
