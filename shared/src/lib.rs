//! Shared types and models for the order-fulfillment service
//!
//! This crate contains the domain model and the pure allocation logic shared
//! between the backend, the order form (via WASM), and the test suites.

pub mod allocator;
pub mod ledger;
pub mod models;
pub mod normalize;
pub mod types;
pub mod validation;

pub use allocator::*;
pub use ledger::*;
pub use models::*;
pub use normalize::*;
pub use types::*;
pub use validation::*;
