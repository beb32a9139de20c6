//! Warehouse stock models

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// Warehouse tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Ready-to-ship units, matched by exact product code
    Finished,
    /// Unpainted units, interchangeable across colour variants of a base key
    SemiFinished,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Finished, Tier::SemiFinished];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Finished => "finished",
            Tier::SemiFinished => "semi_finished",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "finished" => Some(Tier::Finished),
            "semi_finished" => Some(Tier::SemiFinished),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Finished => write!(f, "Finished"),
            Tier::SemiFinished => write!(f, "Semi-finished"),
        }
    }
}

/// One warehouse row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockEntry {
    pub tier: Tier,
    pub product_code: String,
    pub description: String,
    pub base_key: String,
    pub quantity: i64,
}

impl StockEntry {
    pub fn new(
        tier: Tier,
        product_code: impl Into<String>,
        description: impl Into<String>,
        quantity: i64,
    ) -> Self {
        let description = description.into();
        Self {
            tier,
            product_code: product_code.into(),
            base_key: normalize(&description),
            description,
            quantity,
        }
    }
}
