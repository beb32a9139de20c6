//! Domain models used by the server
//!
//! Re-exports models and the allocation pipeline from the shared crate

pub use shared::allocator::{allocate_order, AllocationError, LineAllocation};
pub use shared::ledger::{LedgerSnapshot, SemiMatch, StockLedgerView};
pub use shared::models::*;
pub use shared::normalize::{detect_color, Color};
pub use shared::types::DateRange;
