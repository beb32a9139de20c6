//! Allocation engine
//!
//! Decides, per order line, how much is shipped from finished stock, how
//! much is repainted from semi-finished stock and how much must be
//! fabricated. Pure computation over a [`StockLedgerView`]; nothing here
//! touches the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::StockLedgerView;
use crate::models::{AllocationResult, Order, OrderLine, ProductCatalog};
use crate::validation::validate_quantity;

/// Reasons a line is rejected before allocation
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllocationError {
    #[error("Unknown product: {product_code}")]
    UnknownProduct { product_code: String },

    #[error("Invalid quantity {quantity} for product {product_code}")]
    InvalidQuantity { product_code: String, quantity: i64 },
}

impl AllocationError {
    pub fn product_code(&self) -> &str {
        match self {
            AllocationError::UnknownProduct { product_code }
            | AllocationError::InvalidQuantity { product_code, .. } => product_code,
        }
    }
}

/// Allocation outcome of one order line
pub type LineAllocation = Result<AllocationResult, AllocationError>;

/// Allocate one line against the ledger, reserving what it takes.
///
/// Finished stock is matched by exact product code, semi-finished stock by
/// the ledger's match key, and whatever remains is fabricated.
pub fn allocate(
    line: &OrderLine,
    catalog: &ProductCatalog,
    ledger: &mut StockLedgerView,
) -> LineAllocation {
    if validate_quantity(line.quantity).is_err() {
        return Err(AllocationError::InvalidQuantity {
            product_code: line.product_code.clone(),
            quantity: line.quantity,
        });
    }
    let product = catalog
        .get(&line.product_code)
        .ok_or_else(|| AllocationError::UnknownProduct {
            product_code: line.product_code.clone(),
        })?;

    let requested = line.quantity;
    let from_finished = ledger.reserve_finished(&product.code, requested);
    let mut remaining = requested - from_finished;

    let base_key = ledger
        .semi_match()
        .key_for(&product.code, &product.description);
    let semi_draws = ledger.reserve_semi(&base_key, remaining);
    let from_semi: i64 = semi_draws.iter().map(|d| d.quantity).sum();
    remaining -= from_semi;

    Ok(AllocationResult {
        product_code: product.code.clone(),
        description: product.description.clone(),
        base_key,
        requested,
        from_finished,
        from_semi,
        to_fabricate: remaining,
        semi_draws,
    })
}

/// Allocate every line of an order in sequence.
///
/// Rejected lines reserve nothing and do not affect their siblings.
pub fn allocate_order(
    order: &Order,
    catalog: &ProductCatalog,
    ledger: &mut StockLedgerView,
) -> Vec<LineAllocation> {
    order
        .lines
        .iter()
        .map(|line| allocate(line, catalog, ledger))
        .collect()
}
