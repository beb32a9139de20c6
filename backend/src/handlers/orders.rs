//! HTTP handlers for order placement and tracking

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::OrderStatus;
use crate::services::order::{
    OrderOverview, OrderPreview, OrderSummary, PlaceOrderInput, UpdateOrderStatusInput,
};
use crate::services::OrderService;
use crate::AppState;

fn order_service(state: &AppState) -> OrderService {
    OrderService::new(
        state.store.clone(),
        state.gate.clone(),
        state.config.allocation.semi_match,
    )
}

/// Allocate and commit an order
pub async fn place_order(
    State(state): State<AppState>,
    Json(input): Json<PlaceOrderInput>,
) -> AppResult<Json<OrderSummary>> {
    let summary = order_service(&state).place_order(input).await?;
    Ok(Json(summary))
}

/// Show how an order would be sourced without committing it
pub async fn preview_order(
    State(state): State<AppState>,
    Json(input): Json<PlaceOrderInput>,
) -> AppResult<Json<OrderPreview>> {
    let preview = order_service(&state).preview_order(input).await?;
    Ok(Json(preview))
}

/// List recorded orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<OrderOverview>>> {
    let orders = order_service(&state).list_orders().await?;
    Ok(Json(orders))
}

#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub reference: String,
    pub status: OrderStatus,
}

/// Advance the status of an order
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Json(input): Json<UpdateOrderStatusInput>,
) -> AppResult<Json<OrderStatusResponse>> {
    let status = order_service(&state)
        .update_order_status(&reference, input.status)
        .await?;
    Ok(Json(OrderStatusResponse { reference, status }))
}
