//! Production order models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Work still needed to fulfil an order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionKind {
    /// Finish semi-finished units in the requested colour
    Paint,
    /// Produce new units from raw material
    Fabricate,
}

impl ProductionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionKind::Paint => "paint",
            ProductionKind::Fabricate => "fabricate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "paint" => Some(ProductionKind::Paint),
            "fabricate" => Some(ProductionKind::Fabricate),
            _ => None,
        }
    }
}

/// Production order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    Pending,
    InProgress,
    Done,
}

impl ProductionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionStatus::Pending => "pending",
            ProductionStatus::InProgress => "in_progress",
            ProductionStatus::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProductionStatus::Pending),
            "in_progress" => Some(ProductionStatus::InProgress),
            "done" => Some(ProductionStatus::Done),
            _ => None,
        }
    }

    /// Pending -> InProgress -> Done, no skipping and no going back
    pub fn can_transition_to(&self, next: ProductionStatus) -> bool {
        matches!(
            (self, next),
            (ProductionStatus::Pending, ProductionStatus::InProgress)
                | (ProductionStatus::InProgress, ProductionStatus::Done)
        )
    }
}

/// A paint or fabricate order raised by an order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionOrder {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Product the work produces
    pub product_code: String,
    /// Semi-finished row drawn from (paint orders only)
    pub source_code: Option<String>,
    pub base_key: String,
    pub description: String,
    pub quantity: i64,
    pub requested_by: String,
    pub order_reference: String,
    pub kind: ProductionKind,
    pub status: ProductionStatus,
}
