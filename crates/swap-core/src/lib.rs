//! # Hashlock Swap Core
//!
//! Maker-side coordination of a cross-chain atomic swap with a counterparty
//! auction service.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Commit to a set of random secrets with a single or Merkle hashlock
//! - Place a signed order and confirm the service can see it
//! - Release each secret only when its fill asks for it, until the order is
//!   executed, expired or refunded
//!
//! ## Security Properties
//!
//! | Property | Enforcement |
//! |----------|-------------|
//! | Secrets never logged | `Secret` has a redacted `Debug` and zeroizes on drop |
//! | No premature reveal | A secret is sent only for an index the service reports ready |
//! | No blind submission | `submit_order` runs only after the order is discoverable |
//! | Keccak only | Secret hashes and Merkle nodes use keccak256 |
//!
//! ## Module Structure
//!
//! ```text
//! swap-core/
//! ├── domain/          # Secret, HashLock, Quote, Order, errors
//! ├── algorithms/      # Secret vault, Merkle tree, hashlock builder
//! ├── ports/           # AtomicSwapApi, SwapGateway, Ledger
//! ├── adapters/        # SimulatedGateway, InMemoryLedger
//! └── service/         # OrderCoordinator, RevealScheduler, SwapService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    address_from_key, order_hash, InMemoryLedger, SimulatedGateway, SimulationConfig,
};
pub use algorithms::{
    hash_secret, merkle_leaf, verify_secret, HashlockBuilder, SecretMerkleTree, SecretVault,
    MAX_SECRETS,
};
pub use domain::{
    format_address, invariant_fill_index_in_range, invariant_hashlock_variant,
    invariant_secret_count, invariant_secret_matches, parse_address, Address, ChainId,
    CreatedOrder, FillRequest, FillStatus, GatewayError, Hash, HashLock, LedgerError, Order,
    OrderRequest, OrderStatusReport, Preset, PresetInfo, Quote, QuoteParams, ReadyFills,
    RevealExit, RevealReport, SchedulerState, Secret, SwapConfig, SwapError, SwapOutcome,
    SwapStatus,
};
pub use ports::{AtomicSwapApi, GatewayCall, Ledger, MockSwapGateway, SwapGateway};
pub use service::{OrderCoordinator, RevealScheduler, SwapService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
