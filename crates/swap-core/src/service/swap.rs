//! # Swap Service
//!
//! Wires the vault, hashlock builder, coordinator and scheduler into one
//! swap attempt.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use super::coordinator::OrderCoordinator;
use super::scheduler::{shutdown_requested, RevealScheduler};
use crate::algorithms::{HashlockBuilder, SecretVault};
use crate::domain::{
    invariant_hashlock_variant, invariant_secret_count, OrderRequest, QuoteParams, SwapConfig,
    SwapError, SwapOutcome,
};
use crate::ports::{AtomicSwapApi, SwapGateway};

/// Runs swap attempts against one gateway.
pub struct SwapService {
    gateway: Arc<dyn SwapGateway>,
    config: SwapConfig,
}

impl SwapService {
    /// Create a service.
    pub fn new(gateway: Arc<dyn SwapGateway>, config: SwapConfig) -> Self {
        Self { gateway, config }
    }

    /// Swap configuration in use.
    pub fn config(&self) -> &SwapConfig {
        &self.config
    }
}

#[async_trait]
impl AtomicSwapApi for SwapService {
    async fn execute(
        &self,
        params: QuoteParams,
        shutdown: watch::Receiver<bool>,
    ) -> Result<SwapOutcome, SwapError> {
        let attempt_id = Uuid::new_v4();
        let preset = self.config.preset;
        info!(attempt = %attempt_id, preset = %preset, "[swap] Starting swap attempt");

        if shutdown_requested(&shutdown) {
            info!(attempt = %attempt_id, "[swap] Shutdown requested, not starting");
            return Err(SwapError::Cancelled);
        }

        let coordinator =
            OrderCoordinator::new(Arc::clone(&self.gateway), self.config.settle_delay);

        let quote = coordinator.request_quote(&params).await?;
        let secrets_count = OrderCoordinator::secrets_count(&quote, preset)?;

        let vault = SecretVault::generate(secrets_count)?;
        invariant_secret_count(vault.len(), secrets_count)?;

        let hash_lock = HashlockBuilder::build(vault.secrets())?;
        if !invariant_hashlock_variant(&hash_lock, vault.len()) {
            return Err(SwapError::InvalidSecretCount {
                expected: secrets_count,
                got: hash_lock.secrets_count(),
            });
        }

        let request = OrderRequest {
            wallet: params.wallet,
            hash_lock,
            preset,
            secret_hashes: vault.secret_hashes().to_vec(),
        };
        if shutdown_requested(&shutdown) {
            return Err(SwapError::Cancelled);
        }
        let created = coordinator.place_order(&quote, &request, &shutdown).await?;

        let mut scheduler =
            RevealScheduler::new(Arc::clone(&self.gateway), self.config.poll_interval);
        let report = scheduler.run(&created.order_hash, &vault, shutdown).await;

        info!(
            attempt = %attempt_id,
            order_hash = %hex::encode(created.order_hash),
            exit = ?report.exit,
            revealed = report.revealed.len(),
            "[swap] Swap attempt finished"
        );

        Ok(SwapOutcome {
            attempt_id,
            order_hash: created.order_hash,
            quote_id: created.quote_id,
            secrets_count,
            report,
        })
    }
}
