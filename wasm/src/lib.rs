//! WebAssembly module for the order-fulfillment allocator
//!
//! Provides client-side computation for the order form:
//! - Description normalization and colour detection
//! - Order line validation
//! - Allocation preview against a stock snapshot

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::validation::*;

use shared::{allocate_order, detect_color, normalize, LedgerSnapshot, SemiMatch, StockLedgerView};

/// Base key shared by all colour variants of a description
#[wasm_bindgen]
pub fn normalize_description(description: &str) -> String {
    normalize(description)
}

/// Palette colour named in a description, if any
#[wasm_bindgen]
pub fn detect_description_color(description: &str) -> Option<String> {
    detect_color(description).map(|c| c.as_str().to_string())
}

/// Validate one order line; returns the problem, or nothing when valid
#[wasm_bindgen]
pub fn validate_order_line(product_code: &str, quantity: i32) -> Option<String> {
    validate_product_code(product_code)
        .and_then(|_| validate_quantity(i64::from(quantity)))
        .err()
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct StockRow {
    tier: Tier,
    product_code: String,
    description: String,
    quantity: i64,
}

/// Snapshot and lines sent by the order form
#[derive(Debug, Deserialize)]
struct PreviewRequest {
    products: Vec<Product>,
    stock: Vec<StockRow>,
    lines: Vec<OrderLine>,
    #[serde(default)]
    semi_match: SemiMatch,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct PreviewRow {
    product_code: String,
    requested: i64,
    from_finished: i64,
    from_semi: i64,
    to_fabricate: i64,
    outcome: String,
}

fn preview(request: PreviewRequest) -> Vec<PreviewRow> {
    let catalog = ProductCatalog::new(request.products);
    let entries: Vec<StockEntry> = request
        .stock
        .into_iter()
        .map(|row| StockEntry::new(row.tier, row.product_code, row.description, row.quantity))
        .collect();
    let mut ledger =
        StockLedgerView::new(LedgerSnapshot::from_entries(&entries, request.semi_match));

    let order = Order {
        id: Default::default(),
        reference: String::new(),
        customer: String::new(),
        requested_by: String::new(),
        created_at: Default::default(),
        lines: request.lines,
    };

    allocate_order(&order, &catalog, &mut ledger)
        .into_iter()
        .zip(&order.lines)
        .map(|(result, line)| match result {
            Ok(allocation) => PreviewRow {
                outcome: allocation.outcome_label(),
                product_code: allocation.product_code,
                requested: allocation.requested,
                from_finished: allocation.from_finished,
                from_semi: allocation.from_semi,
                to_fabricate: allocation.to_fabricate,
            },
            Err(error) => PreviewRow {
                product_code: line.product_code.clone(),
                requested: line.quantity,
                from_finished: 0,
                from_semi: 0,
                to_fabricate: 0,
                outcome: error.to_string(),
            },
        })
        .collect()
}

/// Allocate order lines against a stock snapshot without touching the server.
///
/// Takes `{products, stock, lines, semi_match?}` as JSON and returns the
/// per-line rows as JSON.
#[wasm_bindgen]
pub fn preview_allocation(request_json: &str) -> Result<String, JsValue> {
    let request: PreviewRequest = serde_json::from_str(request_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid preview JSON: {}", e)))?;

    serde_json::to_string(&preview(request))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_description() {
        assert_eq!(
            normalize_description("wood table red 40cm unit"),
            "WOOD TABLE40CM"
        );
    }

    #[test]
    fn test_detect_description_color() {
        assert_eq!(
            detect_description_color("SILLA AZUL 30CM"),
            Some("blue".to_string())
        );
        assert_eq!(detect_description_color("PLAIN STOOL"), None);
    }

    #[test]
    fn test_validate_order_line() {
        assert_eq!(validate_order_line("X1", 2), None);
        assert!(validate_order_line("X1", 0).is_some());
        assert!(validate_order_line("", 2).is_some());
    }

    #[test]
    fn test_preview_allocation() {
        let json = r#"{
            "products": [{"code": "X1", "description": "WOOD CHAIR RED 30CM"}],
            "stock": [
                {"tier": "finished", "product_code": "X1", "description": "WOOD CHAIR RED 30CM", "quantity": 2},
                {"tier": "semi_finished", "product_code": "S1", "description": "WOOD CHAIR 30CM", "quantity": 1}
            ],
            "lines": [
                {"product_code": "X1", "quantity": 5},
                {"product_code": "NOPE", "quantity": 1}
            ]
        }"#;

        let rows: Vec<serde_json::Value> =
            serde_json::from_str(&preview_allocation(json).unwrap()).unwrap();
        assert_eq!(rows[0]["from_finished"], 2);
        assert_eq!(rows[0]["from_semi"], 1);
        assert_eq!(rows[0]["to_fabricate"], 2);
        assert_eq!(rows[0]["outcome"], "Finished + Semi-finished + Fabricate");
        assert_eq!(rows[1]["outcome"], "Unknown product: NOPE");
    }

    #[test]
    fn test_preview_exact_code_matching() {
        let request = PreviewRequest {
            products: vec![Product::new("X1", "WOOD CHAIR RED 30CM")],
            stock: vec![StockRow {
                tier: Tier::SemiFinished,
                product_code: "S1".to_string(),
                description: "WOOD CHAIR 30CM".to_string(),
                quantity: 4,
            }],
            lines: vec![OrderLine::new("X1", 2)],
            semi_match: SemiMatch::ExactCode,
        };

        let rows = preview(request);
        assert_eq!(rows[0].from_semi, 0);
        assert_eq!(rows[0].to_fabricate, 2);
    }
}
