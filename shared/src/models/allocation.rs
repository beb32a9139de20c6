//! Allocation result models

use serde::{Deserialize, Serialize};

/// Units drawn from one semi-finished row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SemiDraw {
    pub product_code: String,
    pub quantity: i64,
}

/// How one order line is sourced.
///
/// `from_finished + from_semi + to_fabricate == requested`, and the semi
/// draws add up to `from_semi`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationResult {
    pub product_code: String,
    pub description: String,
    /// Key the semi-finished tier was matched on
    pub base_key: String,
    pub requested: i64,
    pub from_finished: i64,
    pub from_semi: i64,
    pub to_fabricate: i64,
    pub semi_draws: Vec<SemiDraw>,
}

impl AllocationResult {
    pub fn is_consistent(&self) -> bool {
        self.from_finished >= 0
            && self.from_semi >= 0
            && self.to_fabricate >= 0
            && self.from_finished + self.from_semi + self.to_fabricate == self.requested
            && self.semi_draws.iter().map(|d| d.quantity).sum::<i64>() == self.from_semi
    }

    /// Operator-facing summary, e.g. "Finished + Fabricate"
    pub fn outcome_label(&self) -> String {
        let mut parts = Vec::new();
        if self.from_finished > 0 {
            parts.push("Finished");
        }
        if self.from_semi > 0 {
            parts.push("Semi-finished");
        }
        if self.to_fabricate > 0 {
            parts.push("Fabricate");
        }
        parts.join(" + ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(finished: i64, semi: i64, fabricate: i64) -> AllocationResult {
        AllocationResult {
            product_code: "X1".to_string(),
            description: "CHAIR".to_string(),
            base_key: "CHAIR".to_string(),
            requested: finished + semi + fabricate,
            from_finished: finished,
            from_semi: semi,
            to_fabricate: fabricate,
            semi_draws: if semi > 0 {
                vec![SemiDraw {
                    product_code: "S1".to_string(),
                    quantity: semi,
                }]
            } else {
                vec![]
            },
        }
    }

    #[test]
    fn test_outcome_label() {
        assert_eq!(result(3, 0, 0).outcome_label(), "Finished");
        assert_eq!(result(2, 3, 0).outcome_label(), "Finished + Semi-finished");
        assert_eq!(result(0, 1, 2).outcome_label(), "Semi-finished + Fabricate");
    }

    #[test]
    fn test_consistency_detects_draw_mismatch() {
        let mut r = result(1, 2, 3);
        assert!(r.is_consistent());
        r.semi_draws[0].quantity = 1;
        assert!(!r.is_consistent());
    }
}
