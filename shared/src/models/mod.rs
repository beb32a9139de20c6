//! Domain models for the order-fulfillment service

mod allocation;
mod movement;
mod order;
mod product;
mod production;
mod stock;

pub use allocation::*;
pub use movement::*;
pub use order::*;
pub use product::*;
pub use production::*;
pub use stock::*;
