//! # Hashlock Swap
//!
//! Runs one maker-side cross-chain swap: quote, commit to secrets, place the
//! order, then release secrets as fills ask for them.
//!
//! ## Environment
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `MAKER_PRIVATE_KEY` | yes | |
//! | `MAKER_ADDRESS` | yes | |
//! | `NODE_URL` | yes | |
//! | `DEV_PORTAL_API_KEY` | yes | |
//! | `SWAP_SRC_CHAIN` / `SWAP_DST_CHAIN` | no | `ethereum` / `polygon` |
//! | `SWAP_SRC_TOKEN` / `SWAP_DST_TOKEN` | no | USDC / LINK |
//! | `SWAP_AMOUNT` | no | `1000000000` |
//! | `SWAP_PRESET` | no | `fast` |
//! | `SWAP_POLL_INTERVAL_SECS` | no | `5` (1..=86400) |
//! | `SWAP_SETTLE_DELAY_SECS` | no | `2` (0..=300) |
//! | `SWAP_LOG_LEVEL` | no | `info` (overridden by `RUST_LOG`) |

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use swap_core::SwapError;
use swap_runtime::{RuntimeConfig, SwapRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let runtime = SwapRuntime::new(config);

    let run = runtime.run();
    tokio::pin!(run);

    let result = tokio::select! {
        outcome = &mut run => outcome,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => runtime.shutdown(),
                Err(e) => warn!("[swap] Failed to listen for Ctrl+C: {}", e),
            }
            run.await
        }
    };

    let outcome = match result {
        Err(SwapError::Cancelled) => {
            info!("[swap] Stopped before any order was submitted");
            return Ok(());
        }
        other => other.context("Swap attempt failed")?,
    };

    info!(
        attempt = %outcome.attempt_id,
        quote_id = %outcome.quote_id,
        secrets = outcome.secrets_count,
        exit = ?outcome.report.exit,
        "[swap] Done"
    );

    Ok(())
}
