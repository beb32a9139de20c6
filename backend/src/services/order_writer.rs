//! Order transaction writer
//!
//! Applies allocation results to the inventory store one line at a time.
//! The store has no multi-row transactions, so a failure leaves earlier
//! lines committed; the [`CommitReport`] spells out exactly which writes
//! landed and which the operator has to resubmit.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AllocationError, AllocationResult, Direction, LineAllocation, LineSource, MovementRecord,
    Order, OrderLineRecord, OrderStatus, ProductionKind, ProductionOrder, ProductionStatus, Tier,
};
use crate::store::{InventoryStore, StockDecrement, StoreError};

/// Commit-time failures. Both stop the order: nothing is retried.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommitError {
    #[error("Stock write failed: {message}")]
    StockWriteFailure { message: String },

    #[error("Stale snapshot: {tier} stock for {product_code} is {on_hand}, cannot take {requested}")]
    InconsistentSnapshot {
        tier: Tier,
        product_code: String,
        on_hand: i64,
        requested: i64,
    },
}

impl From<StoreError> for CommitError {
    fn from(err: StoreError) -> Self {
        CommitError::StockWriteFailure {
            message: err.to_string(),
        }
    }
}

/// One external write derived from an allocation
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "write", rename_all = "snake_case")]
pub enum PlannedWrite {
    DecrementStock {
        tier: Tier,
        product_code: String,
        quantity: i64,
    },
    Movement(MovementRecord),
    ProductionOrder(ProductionOrder),
    OrderLine(OrderLineRecord),
}

/// What happened to one order line
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineOutcome {
    Committed {
        writes: Vec<PlannedWrite>,
    },
    /// Rejected before allocation; nothing was written
    Rejected {
        error: AllocationError,
    },
    Failed {
        error: CommitError,
        written: Vec<PlannedWrite>,
        failed: PlannedWrite,
        remaining: Vec<PlannedWrite>,
    },
    /// Skipped because an earlier line failed
    NotAttempted,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub line_index: usize,
    pub product_code: String,
    pub allocation: Option<AllocationResult>,
    pub outcome: LineOutcome,
}

impl LineReport {
    /// Writes that actually reached the store
    pub fn written(&self) -> &[PlannedWrite] {
        match &self.outcome {
            LineOutcome::Committed { writes } => writes,
            LineOutcome::Failed { written, .. } => written,
            LineOutcome::Rejected { .. } | LineOutcome::NotAttempted => &[],
        }
    }
}

/// Per-line result of committing an order
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    pub order_id: Uuid,
    pub order_reference: String,
    pub lines: Vec<LineReport>,
}

impl CommitReport {
    /// True when every line was committed
    pub fn is_complete(&self) -> bool {
        self.lines
            .iter()
            .all(|l| matches!(l.outcome, LineOutcome::Committed { .. }))
    }

    pub fn failed_line(&self) -> Option<&LineReport> {
        self.lines
            .iter()
            .find(|l| matches!(l.outcome, LineOutcome::Failed { .. }))
    }

    fn written(&self) -> impl Iterator<Item = &PlannedWrite> {
        self.lines.iter().flat_map(|l| l.written().iter())
    }

    pub fn movements(&self) -> Vec<&MovementRecord> {
        self.written()
            .filter_map(|w| match w {
                PlannedWrite::Movement(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn production_orders(&self, kind: ProductionKind) -> Vec<&ProductionOrder> {
        self.written()
            .filter_map(|w| match w {
                PlannedWrite::ProductionOrder(order) if order.kind == kind => Some(order),
                _ => None,
            })
            .collect()
    }
}

struct LineFailure {
    error: CommitError,
    written: Vec<PlannedWrite>,
    failed: PlannedWrite,
    remaining: Vec<PlannedWrite>,
}

/// Writes allocation results to the inventory store
#[derive(Clone)]
pub struct OrderTransactionWriter {
    store: Arc<dyn InventoryStore>,
}

impl OrderTransactionWriter {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Commit an order's allocations line by line.
    ///
    /// Rejected lines are reported and skipped. The first failing write
    /// stops its line and every later line.
    pub async fn commit(&self, order: &Order, results: &[LineAllocation]) -> CommitReport {
        let now = Utc::now();
        let mut lines = Vec::with_capacity(results.len());
        let mut halted = false;

        for (line_index, result) in results.iter().enumerate() {
            let report = match result {
                Err(error) => {
                    tracing::warn!(
                        "Order {} line {} rejected: {}",
                        order.reference,
                        line_index + 1,
                        error
                    );
                    LineReport {
                        line_index,
                        product_code: error.product_code().to_string(),
                        allocation: None,
                        outcome: LineOutcome::Rejected {
                            error: error.clone(),
                        },
                    }
                }
                Ok(allocation) if halted => LineReport {
                    line_index,
                    product_code: allocation.product_code.clone(),
                    allocation: Some(allocation.clone()),
                    outcome: LineOutcome::NotAttempted,
                },
                Ok(allocation) => {
                    let writes = plan_line(order, line_index, allocation, now);
                    let outcome = match self.apply(writes).await {
                        Ok(writes) => {
                            tracing::info!(
                                "Order {} line {} committed: {} finished, {} semi-finished, {} to fabricate",
                                order.reference,
                                line_index + 1,
                                allocation.from_finished,
                                allocation.from_semi,
                                allocation.to_fabricate
                            );
                            LineOutcome::Committed { writes }
                        }
                        Err(failure) => {
                            tracing::warn!(
                                "Order {} line {} failed after {} writes: {}",
                                order.reference,
                                line_index + 1,
                                failure.written.len(),
                                failure.error
                            );
                            halted = true;
                            LineOutcome::Failed {
                                error: failure.error,
                                written: failure.written,
                                failed: failure.failed,
                                remaining: failure.remaining,
                            }
                        }
                    };
                    LineReport {
                        line_index,
                        product_code: allocation.product_code.clone(),
                        allocation: Some(allocation.clone()),
                        outcome,
                    }
                }
            };
            lines.push(report);
        }

        CommitReport {
            order_id: order.id,
            order_reference: order.reference.clone(),
            lines,
        }
    }

    async fn apply(&self, writes: Vec<PlannedWrite>) -> Result<Vec<PlannedWrite>, LineFailure> {
        let mut pending = writes.into_iter();
        let mut written = Vec::new();

        while let Some(write) = pending.next() {
            if let Err(error) = self.execute(&write).await {
                return Err(LineFailure {
                    error,
                    written,
                    failed: write,
                    remaining: pending.collect(),
                });
            }
            written.push(write);
        }

        Ok(written)
    }

    async fn execute(&self, write: &PlannedWrite) -> Result<(), CommitError> {
        match write {
            PlannedWrite::DecrementStock {
                tier,
                product_code,
                quantity,
            } => match self.store.decrement_stock(*tier, product_code, *quantity).await? {
                StockDecrement::Applied { .. } => {}
                StockDecrement::Insufficient { on_hand } => {
                    return Err(CommitError::InconsistentSnapshot {
                        tier: *tier,
                        product_code: product_code.clone(),
                        on_hand,
                        requested: *quantity,
                    });
                }
            },
            PlannedWrite::Movement(record) => self.store.append_movement(record).await?,
            PlannedWrite::ProductionOrder(order) => {
                self.store.append_production_order(order).await?
            }
            PlannedWrite::OrderLine(record) => self.store.append_order_line(record).await?,
        }
        Ok(())
    }
}

/// Derive the writes for one allocated line, in the order they are applied:
/// each stock draw is decremented, then recorded as a movement (plus a paint
/// order for semi-finished draws), then audited; fabrication comes last.
pub fn plan_line(
    order: &Order,
    line_index: usize,
    allocation: &AllocationResult,
    now: DateTime<Utc>,
) -> Vec<PlannedWrite> {
    let mut writes = Vec::new();

    if allocation.from_finished > 0 {
        writes.push(PlannedWrite::DecrementStock {
            tier: Tier::Finished,
            product_code: allocation.product_code.clone(),
            quantity: allocation.from_finished,
        });
        writes.push(PlannedWrite::Movement(movement(
            order,
            Tier::Finished,
            &allocation.product_code,
            allocation.from_finished,
            now,
        )));
        writes.push(PlannedWrite::OrderLine(audit_row(
            order,
            line_index,
            allocation,
            LineSource::Finished,
            allocation.from_finished,
        )));
    }

    for draw in allocation.semi_draws.iter().filter(|d| d.quantity > 0) {
        writes.push(PlannedWrite::DecrementStock {
            tier: Tier::SemiFinished,
            product_code: draw.product_code.clone(),
            quantity: draw.quantity,
        });
        writes.push(PlannedWrite::Movement(movement(
            order,
            Tier::SemiFinished,
            &draw.product_code,
            draw.quantity,
            now,
        )));
        writes.push(PlannedWrite::ProductionOrder(production_order(
            order,
            allocation,
            ProductionKind::Paint,
            Some(draw.product_code.clone()),
            draw.quantity,
            now,
        )));
        writes.push(PlannedWrite::OrderLine(audit_row(
            order,
            line_index,
            allocation,
            LineSource::SemiFinished,
            draw.quantity,
        )));
    }

    if allocation.to_fabricate > 0 {
        writes.push(PlannedWrite::ProductionOrder(production_order(
            order,
            allocation,
            ProductionKind::Fabricate,
            None,
            allocation.to_fabricate,
            now,
        )));
        writes.push(PlannedWrite::OrderLine(audit_row(
            order,
            line_index,
            allocation,
            LineSource::Fabricate,
            allocation.to_fabricate,
        )));
    }

    writes
}

fn movement(
    order: &Order,
    tier: Tier,
    product_code: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> MovementRecord {
    MovementRecord {
        id: Uuid::new_v4(),
        occurred_at: now,
        product_code: product_code.to_string(),
        direction: Direction::Outbound,
        quantity,
        tier,
        user: order.requested_by.clone(),
        order_reference: order.reference.clone(),
    }
}

fn production_order(
    order: &Order,
    allocation: &AllocationResult,
    kind: ProductionKind,
    source_code: Option<String>,
    quantity: i64,
    now: DateTime<Utc>,
) -> ProductionOrder {
    ProductionOrder {
        id: Uuid::new_v4(),
        created_at: now,
        product_code: allocation.product_code.clone(),
        source_code,
        base_key: allocation.base_key.clone(),
        description: allocation.description.clone(),
        quantity,
        requested_by: order.requested_by.clone(),
        order_reference: order.reference.clone(),
        kind,
        status: ProductionStatus::Pending,
    }
}

fn audit_row(
    order: &Order,
    line_index: usize,
    allocation: &AllocationResult,
    source: LineSource,
    quantity: i64,
) -> OrderLineRecord {
    OrderLineRecord {
        id: Uuid::new_v4(),
        order_id: order.id,
        order_reference: order.reference.clone(),
        customer: order.customer.clone(),
        requested_by: order.requested_by.clone(),
        created_at: order.created_at,
        line_index: line_index as i32 + 1,
        product_code: allocation.product_code.clone(),
        description: allocation.description.clone(),
        source,
        quantity,
        status: OrderStatus::Pending,
    }
}
