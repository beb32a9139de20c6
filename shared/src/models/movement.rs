//! Stock movement models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tier;

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "inbound" => Some(Direction::Inbound),
            "outbound" => Some(Direction::Outbound),
            _ => None,
        }
    }
}

/// Append-only record of units leaving (or entering) a warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovementRecord {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub product_code: String,
    pub direction: Direction,
    pub quantity: i64,
    pub tier: Tier,
    pub user: String,
    pub order_reference: String,
}
