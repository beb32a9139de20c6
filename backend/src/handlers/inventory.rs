//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{Product, StockEntry, Tier};
use crate::services::inventory::{
    InventoryAlerts, InventoryDashboard, InventoryQuery, ReportingQuery, StockCountInput,
};
use crate::services::InventoryService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ProductSearchQuery {
    pub q: Option<String>,
}

/// Search the product catalog
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let service = InventoryService::new(state.store.clone());
    let products = service
        .search_products(query.q.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(products))
}

/// List one warehouse tier
pub async fn list_inventory(
    State(state): State<AppState>,
    Path(tier): Path<String>,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<Vec<StockEntry>>> {
    let tier = Tier::from_str(&tier)
        .ok_or_else(|| AppError::NotFound(format!("Inventory tier {}", tier)))?;
    let service = InventoryService::new(state.store.clone());
    let entries = service.list_tier(tier, &query).await?;
    Ok(Json(entries))
}

/// Overwrite one stock cell after a physical count
pub async fn record_stock_count(
    State(state): State<AppState>,
    Path((tier, product_code)): Path<(String, String)>,
    Json(input): Json<StockCountInput>,
) -> AppResult<StatusCode> {
    let tier = Tier::from_str(&tier)
        .ok_or_else(|| AppError::NotFound(format!("Inventory tier {}", tier)))?;
    let service = InventoryService::new(state.store.clone());
    service
        .record_count(tier, &product_code, input.quantity)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Per-tier totals and largest rows; `top` overrides the configured count
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<ReportingQuery>,
) -> AppResult<Json<InventoryDashboard>> {
    let top_n = query.top_n(state.config.reporting.top_n)?;
    let service = InventoryService::new(state.store.clone());
    let dashboard = service.dashboard(top_n).await?;
    Ok(Json(dashboard))
}

/// Low-stock and stale-stock alerts; `threshold` and `days` override the
/// configured values
pub async fn get_alerts(
    State(state): State<AppState>,
    Query(query): Query<ReportingQuery>,
) -> AppResult<Json<InventoryAlerts>> {
    let reporting = &state.config.reporting;
    let threshold = query.low_stock_threshold(reporting.low_stock_threshold)?;
    let days = query.stale_after_days(reporting.stale_after_days)?;

    let service = InventoryService::new(state.store.clone());
    let alerts = service.alerts(threshold, days, Utc::now()).await?;
    Ok(Json(alerts))
}
