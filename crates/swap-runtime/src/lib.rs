//! # Hashlock Swap Runtime
//!
//! Wires configuration, the ledger and a counterparty gateway into one swap
//! attempt, and owns the shutdown signal the reveal loop listens to.
//!
//! ## Startup Sequence
//!
//! 1. Load and validate configuration (environment)
//! 2. Build the ledger and the gateway
//! 3. Log the maker balance of the source asset
//! 4. Run the swap until a terminal status or shutdown

pub mod config;

use std::sync::Arc;

use primitive_types::U256;
use swap_core::{
    format_address, AtomicSwapApi, InMemoryLedger, Ledger, LedgerError, SimulatedGateway,
    SimulationConfig, SwapError, SwapGateway, SwapOutcome, SwapService,
};
use tokio::sync::watch;
use tracing::{error, info};

pub use config::{ConfigError, RuntimeConfig};

/// Owns one swap attempt and its shutdown signal.
pub struct SwapRuntime {
    config: RuntimeConfig,
    ledger: Arc<dyn Ledger>,
    service: SwapService,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl SwapRuntime {
    /// Runtime backed by the in-memory ledger and the simulated network.
    ///
    /// The maker starts with exactly the configured amount of the source token.
    pub fn new(config: RuntimeConfig) -> Self {
        let ledger = Arc::new(InMemoryLedger::new().with_balance(
            config.maker.address,
            config.route.src_token,
            config.route.amount,
        ));
        let gateway = Arc::new(SimulatedGateway::new(
            SimulationConfig::default(),
            ledger.clone(),
            *config.maker.private_key,
        ));
        Self::with_adapters(config, ledger, gateway)
    }

    /// Runtime with caller-supplied adapters.
    pub fn with_adapters(
        config: RuntimeConfig,
        ledger: Arc<dyn Ledger>,
        gateway: Arc<dyn SwapGateway>,
    ) -> Self {
        info!(
            maker = %format_address(&config.maker.address),
            node_url = %config.endpoints.node_url,
            api_url = %config.endpoints.api_url,
            "[swap] Creating swap runtime"
        );

        let service = SwapService::new(gateway, config.swap.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            ledger,
            service,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Query and log the maker balance of the source token.
    pub async fn log_balance(&self) -> Result<U256, LedgerError> {
        let route = &self.config.route;
        let balance = self
            .ledger
            .balance_of(&self.config.maker.address, &route.src_token)
            .await?;
        info!(
            token = %format_address(&route.src_token),
            balance = %format_units(balance, route.src_decimals),
            "[swap] Maker balance"
        );
        Ok(balance)
    }

    /// Run the swap to completion or until [`shutdown`](Self::shutdown).
    pub async fn run(&self) -> Result<SwapOutcome, SwapError> {
        self.log_balance().await?;

        let params = self.config.route.quote_params(self.config.maker.address);
        let outcome = self
            .service
            .execute(params, self.shutdown_rx.clone())
            .await?;

        info!(
            order_hash = %hex::encode(outcome.order_hash),
            final_status = ?outcome.report.final_status(),
            revealed = outcome.report.revealed.len(),
            iterations = outcome.report.iterations,
            "[swap] Swap finished"
        );
        Ok(outcome)
    }

    /// Signal the reveal loop to stop after its current iteration.
    pub fn shutdown(&self) {
        info!("[swap] Initiating shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("[swap] Failed to send shutdown signal: {}", e);
        }
    }

    /// Loaded configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

/// Render base units as a decimal amount with `decimals` fractional digits,
/// trailing zeros trimmed.
pub fn format_units(amount: U256, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let divisor = U256::exp10(decimals as usize);
    let whole = amount / divisor;
    let fraction = (amount % divisor).to_string();

    let padded = format!(
        "{}{}",
        "0".repeat((decimals as usize).saturating_sub(fraction.len())),
        fraction
    );
    let trimmed = padded.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, trimmed)
    }
}
