//! # Service Module
//!
//! Order placement, the reveal loop, and the swap attempt that ties them
//! together.

pub mod coordinator;
pub mod scheduler;
pub mod swap;

pub use coordinator::OrderCoordinator;
pub use scheduler::{RevealScheduler, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL};
pub use swap::SwapService;
