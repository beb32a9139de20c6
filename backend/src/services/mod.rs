//! Business logic services

pub mod commit_gate;
pub mod inventory;
pub mod order;
pub mod order_writer;
pub mod production;
pub mod reporting;

pub use commit_gate::CommitGate;
pub use inventory::InventoryService;
pub use order::OrderService;
pub use production::ProductionService;
pub use reporting::ReportingService;
