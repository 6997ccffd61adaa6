//! # Inbound Ports
//!
//! API trait defining what the swap core can do.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{QuoteParams, SwapError, SwapOutcome};

/// Atomic swap API - inbound port.
#[async_trait]
pub trait AtomicSwapApi: Send + Sync {
    /// Run one complete swap attempt: quote, commit, place, then reveal until
    /// the order is terminal or `shutdown` fires.
    ///
    /// A failure before submission ends the attempt; nothing is retried. If
    /// `shutdown` fires before the order is submitted, the attempt ends with
    /// [`SwapError::Cancelled`] and nothing is published.
    async fn execute(
        &self,
        params: QuoteParams,
        shutdown: watch::Receiver<bool>,
    ) -> Result<SwapOutcome, SwapError>;
}
