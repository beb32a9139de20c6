//! HTTP request handlers

mod health;
mod inventory;
mod orders;
mod production;
mod reporting;

pub use health::*;
pub use inventory::*;
pub use orders::*;
pub use production::*;
pub use reporting::*;
