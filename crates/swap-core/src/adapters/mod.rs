//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports.

mod ledger;
mod simulated_gateway;

pub use ledger::{address_from_key, InMemoryLedger};
pub use simulated_gateway::{order_hash, SimulatedGateway, SimulationConfig};
