//! CSV seed loading for the in-memory store
//!
//! The seed directory mirrors the inventory worksheets:
//! `products.csv` (`code,description`), `finished.csv` and
//! `semi_finished.csv` (`code,description,quantity`).

use std::path::Path;

use serde::Deserialize;

use super::{StoreError, StoreResult};
use crate::models::{Product, StockEntry, Tier};

#[derive(Debug, Deserialize)]
struct ProductRow {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct StockRow {
    code: String,
    description: String,
    quantity: i64,
}

/// Catalog and stock rows read from a seed directory
#[derive(Debug, Default, Clone)]
pub struct SeedData {
    pub products: Vec<Product>,
    pub stock: Vec<StockEntry>,
}

/// Load `products.csv`, `finished.csv` and `semi_finished.csv` from `dir`
pub fn load_seed_dir(dir: &Path) -> StoreResult<SeedData> {
    let products = read_rows::<ProductRow>(&dir.join("products.csv"))?
        .into_iter()
        .map(|row| {
            check_code(&row.code)?;
            Ok(Product::new(row.code, row.description.trim()))
        })
        .collect::<StoreResult<Vec<_>>>()?;

    let mut stock = Vec::new();
    for tier in Tier::ALL {
        let path = dir.join(format!("{}.csv", tier.as_str()));
        for row in read_rows::<StockRow>(&path)? {
            check_code(&row.code)?;
            if row.quantity < 0 {
                return Err(StoreError::Seed(format!(
                    "{}: negative quantity {} for {}",
                    path.display(),
                    row.quantity,
                    row.code
                )));
            }
            stock.push(StockEntry::new(tier, row.code, row.description.trim(), row.quantity));
        }
    }

    tracing::info!(
        "Loaded seed data from {}: {} products, {} stock rows",
        dir.display(),
        products.len(),
        stock.len()
    );

    Ok(SeedData { products, stock })
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> StoreResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;

    reader
        .deserialize()
        .map(|row| row.map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e))))
        .collect()
}

fn check_code(code: &str) -> StoreResult<()> {
    shared::validate_product_code(code)
        .map_err(|e| StoreError::Seed(format!("product code {:?}: {}", code, e)))
}
