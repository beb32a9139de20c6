//! HTTP handlers for production orders

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::ProductionOrder;
use crate::services::production::{ProductionQuery, ProductionSummary, UpdateProductionStatusInput};
use crate::services::ProductionService;
use crate::AppState;

/// List paint and fabricate orders
pub async fn list_production(
    State(state): State<AppState>,
    Query(query): Query<ProductionQuery>,
) -> AppResult<Json<Vec<ProductionOrder>>> {
    let service = ProductionService::new(state.store.clone());
    let orders = service.list(&query).await?;
    Ok(Json(orders))
}

/// Quantities to produce, grouped by description
pub async fn get_production_summary(
    State(state): State<AppState>,
    Query(query): Query<ProductionQuery>,
) -> AppResult<Json<Vec<ProductionSummary>>> {
    let service = ProductionService::new(state.store.clone());
    let summary = service.summary(&query).await?;
    Ok(Json(summary))
}

/// Advance a production order
pub async fn update_production_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductionStatusInput>,
) -> AppResult<Json<ProductionOrder>> {
    let service = ProductionService::new(state.store.clone());
    let order = service.update_status(id, input.status).await?;
    Ok(Json(order))
}
