//! Stock ledger view
//!
//! A read-only snapshot of both warehouse tiers taken once per order, plus
//! the in-memory reservation overlay that keeps later lines of the same order
//! from spending units already promised to earlier ones.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{SemiDraw, StockEntry, Tier};
use crate::normalize::normalize;

/// How semi-finished rows are matched to a requested product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemiMatch {
    /// Match any colour variant sharing the normalized base key
    #[default]
    BaseKey,
    /// Match only the identical product code
    ExactCode,
}

impl SemiMatch {
    /// Key a product is looked up under in the semi-finished tier
    pub fn key_for(&self, product_code: &str, description: &str) -> String {
        match self {
            SemiMatch::BaseKey => normalize(description),
            SemiMatch::ExactCode => product_code.to_string(),
        }
    }
}

/// One semi-finished row contributing to a key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SemiSource {
    pub product_code: String,
    pub quantity: i64,
}

/// Quantities on hand at the moment the order started processing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub semi_match: SemiMatch,
    pub finished: HashMap<String, i64>,
    pub semi_by_base: HashMap<String, i64>,
    /// Rows per key, ordered by product code
    pub semi_sources: HashMap<String, Vec<SemiSource>>,
}

impl LedgerSnapshot {
    /// Build a snapshot from full reads of both tiers.
    ///
    /// Rows are routed by their own tier; duplicate codes are summed and
    /// negative cells count as empty.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a StockEntry>,
        semi_match: SemiMatch,
    ) -> Self {
        let mut finished: HashMap<String, i64> = HashMap::new();
        let mut semi_rows: HashMap<String, BTreeMap<String, i64>> = HashMap::new();

        for entry in entries {
            let quantity = entry.quantity.max(0);
            match entry.tier {
                Tier::Finished => {
                    *finished.entry(entry.product_code.clone()).or_default() += quantity;
                }
                Tier::SemiFinished => {
                    let key = match semi_match {
                        SemiMatch::BaseKey => entry.base_key.clone(),
                        SemiMatch::ExactCode => entry.product_code.clone(),
                    };
                    *semi_rows
                        .entry(key)
                        .or_default()
                        .entry(entry.product_code.clone())
                        .or_default() += quantity;
                }
            }
        }

        let mut semi_by_base = HashMap::new();
        let mut semi_sources = HashMap::new();
        for (key, rows) in semi_rows {
            semi_by_base.insert(key.clone(), rows.values().sum());
            semi_sources.insert(
                key,
                rows.into_iter()
                    .map(|(product_code, quantity)| SemiSource {
                        product_code,
                        quantity,
                    })
                    .collect(),
            );
        }

        Self {
            semi_match,
            finished,
            semi_by_base,
            semi_sources,
        }
    }

    pub fn finished_on_hand(&self, product_code: &str) -> i64 {
        self.finished.get(product_code).copied().unwrap_or(0)
    }

    pub fn semi_on_hand(&self, key: &str) -> i64 {
        self.semi_by_base.get(key).copied().unwrap_or(0)
    }
}

/// Snapshot plus the reservation overlay for one order run
#[derive(Debug, Clone)]
pub struct StockLedgerView {
    snapshot: LedgerSnapshot,
    reserved_finished: HashMap<String, i64>,
    reserved_semi: HashMap<String, i64>,
}

impl StockLedgerView {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot,
            reserved_finished: HashMap::new(),
            reserved_semi: HashMap::new(),
        }
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    pub fn semi_match(&self) -> SemiMatch {
        self.snapshot.semi_match
    }

    pub fn reserved_finished(&self, product_code: &str) -> i64 {
        self.reserved_finished.get(product_code).copied().unwrap_or(0)
    }

    pub fn reserved_semi(&self, key: &str) -> i64 {
        self.reserved_semi.get(key).copied().unwrap_or(0)
    }

    pub fn available_finished(&self, product_code: &str) -> i64 {
        (self.snapshot.finished_on_hand(product_code) - self.reserved_finished(product_code)).max(0)
    }

    pub fn available_semi(&self, key: &str) -> i64 {
        (self.snapshot.semi_on_hand(key) - self.reserved_semi(key)).max(0)
    }

    /// Reserve up to `quantity` finished units, returning how many were reserved
    pub fn reserve_finished(&mut self, product_code: &str, quantity: i64) -> i64 {
        let taken = quantity.clamp(0, self.available_finished(product_code));
        if taken > 0 {
            *self
                .reserved_finished
                .entry(product_code.to_string())
                .or_default() += taken;
        }
        taken
    }

    /// Reserve up to `quantity` semi-finished units under `key`.
    ///
    /// Rows are consumed smallest product code first; earlier reservations
    /// under the same key occupy the head of that sequence, so the returned
    /// draws are the next units in line and may span several rows.
    pub fn reserve_semi(&mut self, key: &str, quantity: i64) -> Vec<SemiDraw> {
        let taken = quantity.clamp(0, self.available_semi(key));
        if taken == 0 {
            return Vec::new();
        }

        let mut skip = self.reserved_semi(key);
        let mut remaining = taken;
        let mut draws = Vec::new();
        for source in self.snapshot.semi_sources.get(key).into_iter().flatten() {
            if remaining == 0 {
                break;
            }
            let already_used = skip.min(source.quantity);
            skip -= already_used;
            let free = source.quantity - already_used;
            let used = free.min(remaining);
            if used > 0 {
                draws.push(SemiDraw {
                    product_code: source.product_code.clone(),
                    quantity: used,
                });
                remaining -= used;
            }
        }

        *self.reserved_semi.entry(key.to_string()).or_default() += taken;
        draws
    }
}
