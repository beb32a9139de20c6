//! Customer order models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One requested product within an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub product_code: String,
    pub quantity: i64,
}

impl OrderLine {
    pub fn new(product_code: impl Into<String>, quantity: i64) -> Self {
        Self {
            product_code: product_code.into(),
            quantity,
        }
    }
}

/// A submitted order. Amendments are placed as new orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Human-readable reference stamped on movements and production orders
    pub reference: String,
    pub customer: String,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn new(
        id: Uuid,
        customer: impl Into<String>,
        requested_by: impl Into<String>,
        created_at: DateTime<Utc>,
        lines: Vec<OrderLine>,
    ) -> Self {
        Self {
            id,
            reference: order_reference(created_at, id),
            customer: customer.into(),
            requested_by: requested_by.into(),
            created_at,
            lines,
        }
    }
}

/// Build the `ORD<yyyymmddHHMMSS>-<id prefix>` reference for an order.
///
/// The timestamp keeps references sortable for operators; the first eight
/// hex digits of the order id keep two orders placed in the same second
/// apart.
pub fn order_reference(created_at: DateTime<Utc>, id: Uuid) -> String {
    let hex = id.simple().to_string();
    format!("ORD{}-{}", created_at.format("%Y%m%d%H%M%S"), &hex[..8])
}

/// Where a portion of an order line was sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSource {
    Finished,
    SemiFinished,
    Fabricate,
}

impl LineSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineSource::Finished => "finished",
            LineSource::SemiFinished => "semi_finished",
            LineSource::Fabricate => "fabricate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "finished" => Some(LineSource::Finished),
            "semi_finished" => Some(LineSource::SemiFinished),
            "fabricate" => Some(LineSource::Fabricate),
            _ => None,
        }
    }
}

/// Fulfilment status of an order, tracked on its audit rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// Orders only move forward one step at a time
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::InProgress)
                | (OrderStatus::InProgress, OrderStatus::Completed)
        )
    }
}

/// Audit row: what one order line actually sourced from where
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_reference: String,
    pub customer: String,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub line_index: i32,
    pub product_code: String,
    pub description: String,
    pub source: LineSource,
    pub quantity: i64,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_reference_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let id = Uuid::parse_str("1f0c2a9e-7b3d-4c55-9a10-0e6f2d8b4c21").unwrap();
        assert_eq!(order_reference(at, id), "ORD20240307090501-1f0c2a9e");
    }

    #[test]
    fn test_orders_in_same_second_get_distinct_references() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let a = Order::new(Uuid::new_v4(), "Acme", "ana", at, vec![]);
        let b = Order::new(Uuid::new_v4(), "Globex", "ana", at, vec![]);
        assert_ne!(a.reference, b.reference);
        assert!(a.reference.starts_with("ORD20240307090501-"));
    }

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Pending));
    }
}
