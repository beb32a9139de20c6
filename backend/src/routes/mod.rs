//! Route definitions for the order-fulfillment service

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/products", get(handlers::search_products))
        .nest("/orders", order_routes())
        .nest("/inventory", inventory_routes())
        .route("/movements", get(handlers::list_movements))
        .nest("/production", production_routes())
}

/// Order placement and tracking
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::place_order))
        .route("/preview", post(handlers::preview_order))
        .route("/:reference/status", put(handlers::update_order_status))
}

/// Stock listings and alerts
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/alerts", get(handlers::get_alerts))
        .route("/:tier", get(handlers::list_inventory))
        .route("/:tier/:code", put(handlers::record_stock_count))
}

/// Paint and fabricate orders
fn production_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_production))
        .route("/summary", get(handlers::get_production_summary))
        .route("/:id/status", put(handlers::update_production_status))
}
