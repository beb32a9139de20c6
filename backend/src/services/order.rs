//! Order placement: validate, snapshot, allocate, commit

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    allocate_order, LedgerSnapshot, LineAllocation, Order, OrderLine, OrderLineRecord,
    OrderStatus, ProductCatalog, ProductionKind, SemiMatch, StockLedgerView, Tier,
};
use crate::services::commit_gate::CommitGate;
use crate::services::order_writer::{CommitReport, OrderTransactionWriter};
use crate::store::InventoryStore;
use shared::validate_order_header;

/// Order submitted by an operator
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlaceOrderInput {
    #[validate(length(min = 1))]
    pub requested_by: String,
    #[validate(length(min = 1))]
    pub customer: String,
    #[validate(length(min = 1))]
    pub lines: Vec<OrderLine>,
}

/// One row of the order result table
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderSummaryRow {
    pub product_code: String,
    pub description: String,
    pub requested: i64,
    pub from_finished: i64,
    pub from_semi: i64,
    pub to_fabricate: i64,
    pub outcome: String,
}

impl OrderSummaryRow {
    fn from_allocation(line: &OrderLine, result: &LineAllocation) -> Self {
        match result {
            Ok(allocation) => Self {
                product_code: allocation.product_code.clone(),
                description: allocation.description.clone(),
                requested: allocation.requested,
                from_finished: allocation.from_finished,
                from_semi: allocation.from_semi,
                to_fabricate: allocation.to_fabricate,
                outcome: allocation.outcome_label(),
            },
            Err(error) => Self {
                product_code: line.product_code.clone(),
                description: String::new(),
                requested: line.quantity,
                from_finished: 0,
                from_semi: 0,
                to_fabricate: 0,
                outcome: error.to_string(),
            },
        }
    }
}

/// Result of placing an order
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub reference: String,
    pub customer: String,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub complete: bool,
    pub rows: Vec<OrderSummaryRow>,
    pub report: CommitReport,
}

/// Allocation computed without committing anything
#[derive(Debug, Clone, Serialize)]
pub struct OrderPreview {
    pub customer: String,
    pub requested_by: String,
    pub rows: Vec<OrderSummaryRow>,
}

/// An order reconstructed from its audit rows
#[derive(Debug, Clone, Serialize)]
pub struct OrderOverview {
    pub order_id: Uuid,
    pub reference: String,
    pub customer: String,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLineRecord>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}

/// Order service wiring the allocator to the inventory store
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn InventoryStore>,
    gate: Arc<CommitGate>,
    semi_match: SemiMatch,
}

impl OrderService {
    pub fn new(store: Arc<dyn InventoryStore>, gate: Arc<CommitGate>, semi_match: SemiMatch) -> Self {
        Self {
            store,
            gate,
            semi_match,
        }
    }

    /// Allocate and commit an order.
    ///
    /// Snapshot and commit run under the commit gate so concurrent orders
    /// in this process never allocate the same units.
    pub async fn place_order(&self, input: PlaceOrderInput) -> AppResult<OrderSummary> {
        validate_input(&input)?;

        let order = Order::new(
            Uuid::new_v4(),
            input.customer.trim(),
            input.requested_by.trim(),
            Utc::now(),
            input.lines,
        );
        tracing::info!(
            "Placing order {} for {} ({} lines)",
            order.reference,
            order.customer,
            order.lines.len()
        );

        let _guard = self.gate.acquire().await;
        let results = self.allocate(&order).await?;
        let report = OrderTransactionWriter::new(self.store.clone())
            .commit(&order, &results)
            .await;

        tracing::info!(
            "Order {}: {} movements, {} paint orders, {} fabricate orders",
            order.reference,
            report.movements().len(),
            report.production_orders(ProductionKind::Paint).len(),
            report.production_orders(ProductionKind::Fabricate).len()
        );
        if let Some(failed) = report.failed_line() {
            tracing::warn!(
                "Order {} stopped at line {}; later lines were not attempted",
                order.reference,
                failed.line_index + 1
            );
        }

        let rows = summary_rows(&order.lines, &results);
        Ok(OrderSummary {
            order_id: order.id,
            reference: order.reference,
            customer: order.customer,
            requested_by: order.requested_by,
            created_at: order.created_at,
            complete: report.is_complete(),
            rows,
            report,
        })
    }

    /// Allocate an order against current stock without writing anything
    pub async fn preview_order(&self, input: PlaceOrderInput) -> AppResult<OrderPreview> {
        validate_input(&input)?;

        let order = Order::new(
            Uuid::new_v4(),
            input.customer.trim(),
            input.requested_by.trim(),
            Utc::now(),
            input.lines,
        );
        let results = self.allocate(&order).await?;

        Ok(OrderPreview {
            rows: summary_rows(&order.lines, &results),
            customer: order.customer,
            requested_by: order.requested_by,
        })
    }

    /// Orders recorded in the audit sheet, newest first
    pub async fn list_orders(&self) -> AppResult<Vec<OrderOverview>> {
        let records = self.store.read_order_lines().await?;

        let mut grouped: BTreeMap<Uuid, Vec<OrderLineRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.order_id).or_default().push(record);
        }

        let mut orders: Vec<OrderOverview> = grouped
            .into_values()
            .filter_map(|mut lines| {
                lines.sort_by_key(|l| l.line_index);
                let first = lines.first()?.clone();
                Some(OrderOverview {
                    order_id: first.order_id,
                    reference: first.order_reference,
                    customer: first.customer,
                    requested_by: first.requested_by,
                    created_at: first.created_at,
                    status: first.status,
                    lines,
                })
            })
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(orders)
    }

    /// Move every audit row of an order to the next status
    pub async fn update_order_status(
        &self,
        reference: &str,
        status: OrderStatus,
    ) -> AppResult<OrderStatus> {
        let current = self
            .store
            .read_order_lines()
            .await?
            .into_iter()
            .find(|l| l.order_reference == reference)
            .map(|l| l.status)
            .ok_or_else(|| AppError::NotFound(format!("Order {}", reference)))?;

        if !current.can_transition_to(status) {
            return Err(AppError::InvalidStateTransition(format!(
                "order {} cannot move from {} to {}",
                reference,
                current.as_str(),
                status.as_str()
            )));
        }

        let changed = self
            .store
            .update_order_status(reference, current, status)
            .await?;
        if changed == 0 {
            return Err(AppError::InvalidStateTransition(format!(
                "order {} changed status while moving to {}",
                reference,
                status.as_str()
            )));
        }
        tracing::info!(
            "Order {} moved to {} ({} rows)",
            reference,
            status.as_str(),
            changed
        );

        Ok(status)
    }

    async fn allocate(&self, order: &Order) -> AppResult<Vec<LineAllocation>> {
        let catalog = ProductCatalog::new(self.store.read_product_catalog().await?);
        let mut entries = self.store.read_inventory(Tier::Finished).await?;
        entries.extend(self.store.read_inventory(Tier::SemiFinished).await?);

        let mut ledger =
            StockLedgerView::new(LedgerSnapshot::from_entries(&entries, self.semi_match));
        Ok(allocate_order(order, &catalog, &mut ledger))
    }
}

fn validate_input(input: &PlaceOrderInput) -> AppResult<()> {
    input.validate()?;
    validate_order_header(&input.requested_by, &input.customer, &input.lines)
        .map_err(|msg| AppError::ValidationError(msg.to_string()))
}

fn summary_rows(lines: &[OrderLine], results: &[LineAllocation]) -> Vec<OrderSummaryRow> {
    lines
        .iter()
        .zip(results)
        .map(|(line, result)| OrderSummaryRow::from_allocation(line, result))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, StockEntry};
    use crate::store::MemoryStore;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new(
            vec![
                Product::new("X1", "WOOD CHAIR RED 30CM"),
                Product::new("X2", "WOOD CHAIR BLUE 30CM"),
            ],
            vec![
                StockEntry::new(Tier::Finished, "X1", "WOOD CHAIR RED 30CM", 2),
                StockEntry::new(Tier::SemiFinished, "S1", "WOOD CHAIR 30CM", 4),
            ],
        ))
    }

    fn service(store: Arc<MemoryStore>) -> OrderService {
        OrderService::new(store, Arc::new(CommitGate::new()), SemiMatch::BaseKey)
    }

    fn input(lines: Vec<OrderLine>) -> PlaceOrderInput {
        PlaceOrderInput {
            requested_by: "ana".to_string(),
            customer: "Acme".to_string(),
            lines,
        }
    }

    #[tokio::test]
    async fn test_place_order_summary_rows() {
        let store = store();
        let summary = service(store.clone())
            .place_order(input(vec![
                OrderLine::new("X1", 5),
                OrderLine::new("X2", 3),
                OrderLine::new("ZZ", 1),
            ]))
            .await
            .unwrap();

        assert!(!summary.complete);
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.rows[0].outcome, "Finished + Semi-finished");
        assert_eq!(
            (summary.rows[0].from_finished, summary.rows[0].from_semi),
            (2, 3)
        );
        // only one semi unit left for the blue variant
        assert_eq!(summary.rows[1].from_semi, 1);
        assert_eq!(summary.rows[1].to_fabricate, 2);
        assert_eq!(summary.rows[1].outcome, "Semi-finished + Fabricate");
        assert_eq!(summary.rows[2].outcome, "Unknown product: ZZ");
        assert!(summary.reference.starts_with("ORD"));

        assert_eq!(
            store.stock_quantity(Tier::SemiFinished, "S1").await.unwrap(),
            Some(0)
        );
    }

    #[tokio::test]
    async fn test_missing_customer_is_rejected() {
        let mut order = input(vec![OrderLine::new("X1", 1)]);
        order.customer = "   ".to_string();
        let err = service(store()).place_order(order).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_empty_order_is_rejected() {
        let err = service(store())
            .place_order(input(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let store = store();
        let preview = service(store.clone())
            .preview_order(input(vec![OrderLine::new("X1", 5)]))
            .await
            .unwrap();

        assert_eq!(preview.rows[0].from_semi, 3);
        assert_eq!(
            store.stock_quantity(Tier::Finished, "X1").await.unwrap(),
            Some(2)
        );
        assert!(store.read_movements().await.unwrap().is_empty());
        assert!(store.read_order_lines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_next_order_sees_decremented_stock() {
        let store = store();
        let service = service(store.clone());
        service
            .place_order(input(vec![OrderLine::new("X1", 2)]))
            .await
            .unwrap();
        let second = service
            .place_order(input(vec![OrderLine::new("X1", 2)]))
            .await
            .unwrap();

        assert_eq!(second.rows[0].from_finished, 0);
        assert_eq!(second.rows[0].from_semi, 2);
    }

    #[tokio::test]
    async fn test_concurrent_orders_never_oversell() {
        let store = store();
        let service = service(store.clone());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .place_order(input(vec![OrderLine::new("X1", 2)]))
                        .await
                })
            })
            .collect();

        let mut finished = 0;
        let mut semi = 0;
        for handle in handles {
            let summary = handle.await.unwrap().unwrap();
            assert!(summary.complete);
            finished += summary.rows[0].from_finished;
            semi += summary.rows[0].from_semi;
        }

        assert_eq!(finished, 2);
        assert_eq!(semi, 4);
        assert_eq!(
            store.stock_quantity(Tier::Finished, "X1").await.unwrap(),
            Some(0)
        );
        assert_eq!(
            store.stock_quantity(Tier::SemiFinished, "S1").await.unwrap(),
            Some(0)
        );
    }

    #[tokio::test]
    async fn test_order_status_moves_forward_only() {
        let store = store();
        let service = service(store.clone());
        let summary = service
            .place_order(input(vec![OrderLine::new("X1", 1)]))
            .await
            .unwrap();

        let err = service
            .update_order_status(&summary.reference, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));

        service
            .update_order_status(&summary.reference, OrderStatus::InProgress)
            .await
            .unwrap();
        let orders = service.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::InProgress);
    }

    #[tokio::test]
    async fn test_unknown_order_reference() {
        let err = service(store())
            .update_order_status("ORD19990101000000-00000000", OrderStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_status_update_leaves_other_orders_alone() {
        let store = store();
        let service = service(store.clone());

        let acme = service
            .place_order(input(vec![OrderLine::new("X1", 1)]))
            .await
            .unwrap();
        let mut globex_input = input(vec![OrderLine::new("X1", 1)]);
        globex_input.customer = "Globex".to_string();
        let globex = service.place_order(globex_input).await.unwrap();
        assert_ne!(acme.reference, globex.reference);

        service
            .update_order_status(&acme.reference, OrderStatus::InProgress)
            .await
            .unwrap();

        let orders = service.list_orders().await.unwrap();
        let status_of = |customer: &str| {
            orders
                .iter()
                .find(|o| o.customer == customer)
                .map(|o| o.status)
        };
        assert_eq!(status_of("Acme"), Some(OrderStatus::InProgress));
        assert_eq!(status_of("Globex"), Some(OrderStatus::Pending));

        let movements = store.read_movements().await.unwrap();
        assert_eq!(
            movements
                .iter()
                .filter(|m| m.order_reference == globex.reference)
                .count(),
            1
        );
    }
}
