//! # Reveal Scheduler
//!
//! The poll/decide/reveal loop run after an order is submitted.
//!
//! ## Loop
//!
//! ```text
//!            tick
//!   Polling ──────→ status check ── terminal ──→ Terminal
//!      ↑                 │
//!      │           ready-fill check
//!      │                 │ fills
//!      └──────────── Revealing (release secrets concurrently)
//! ```
//!
//! Query failures are logged and retried on the next tick. A failed release
//! never blocks the other releases of the same batch. Shutdown is observed at
//! every iteration boundary and while waiting for the next tick.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::algorithms::SecretVault;
use crate::domain::{
    invariant_fill_index_in_range, FillStatus, Hash, ReadyFills, RevealExit, RevealReport,
    SchedulerState, SwapStatus,
};
use crate::ports::SwapGateway;

/// Shortest polling interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Longest polling interval; longer requests are clamped.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Releases secrets for ready fills until the order reaches a terminal status.
pub struct RevealScheduler {
    gateway: Arc<dyn SwapGateway>,
    poll_interval: Duration,
    state: SchedulerState,
}

impl RevealScheduler {
    /// Create a scheduler polling every `poll_interval`.
    pub fn new(gateway: Arc<dyn SwapGateway>, poll_interval: Duration) -> Self {
        Self {
            gateway,
            poll_interval,
            state: SchedulerState::Polling,
        }
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run until a terminal status is observed or `shutdown` fires.
    ///
    /// `shutdown` fires when `true` is sent or the sender is dropped. The first
    /// iteration starts one interval after the call. The interval is clamped
    /// to [`MIN_POLL_INTERVAL`]..=[`MAX_POLL_INTERVAL`].
    pub async fn run(
        &mut self,
        order_hash: &Hash,
        vault: &SecretVault,
        mut shutdown: watch::Receiver<bool>,
    ) -> RevealReport {
        let mut report = RevealReport {
            exit: RevealExit::Cancelled,
            revealed: BTreeSet::new(),
            iterations: 0,
            poll_failures: 0,
            release_failures: 0,
        };

        let period = self
            .poll_interval
            .clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL);
        let start = Instant::now()
            .checked_add(period)
            .unwrap_or_else(Instant::now);
        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.state = SchedulerState::Polling;

        info!(
            order_hash = %hex::encode(order_hash),
            interval_ms = period.as_millis() as u64,
            "[swap] Reveal loop started, polling until the order reaches a terminal status"
        );

        loop {
            if shutdown_requested(&shutdown) {
                return Self::cancelled(report);
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Self::cancelled(report);
                    }
                    continue;
                }
            }

            report.iterations += 1;
            info!(
                order_hash = %hex::encode(order_hash),
                iteration = report.iterations,
                "[swap] Polling for fills"
            );
            if let Some(status) = self.iterate(order_hash, vault, &mut report).await {
                self.transition(SchedulerState::Terminal);
                info!(
                    order_hash = %hex::encode(order_hash),
                    status = %status,
                    revealed = report.revealed.len(),
                    "[swap] Order reached terminal status, stopping"
                );
                report.exit = RevealExit::Terminal(status);
                return report;
            }
        }
    }

    /// One status check plus one reveal check.
    ///
    /// Returns the status when it is terminal.
    async fn iterate(
        &mut self,
        order_hash: &Hash,
        vault: &SecretVault,
        report: &mut RevealReport,
    ) -> Option<SwapStatus> {
        match self.gateway.order_status(order_hash).await {
            Ok(status_report) if status_report.status.is_terminal() => {
                return Some(status_report.status);
            }
            Ok(status_report) => {
                debug!(status = %status_report.status, "[swap] Order still live");
            }
            Err(e) => {
                report.poll_failures += 1;
                warn!(error = %e, "[swap] Error checking order status");
            }
        }

        let ready = match self.gateway.ready_fills(order_hash).await {
            Ok(ready) => ready,
            Err(e) => {
                report.poll_failures += 1;
                warn!(error = %e, "[swap] Error fetching fills ready for secrets");
                return None;
            }
        };

        let indices = releasable_indices(&ready, vault.len());
        if indices.is_empty() {
            return None;
        }

        self.transition(SchedulerState::Revealing);
        let gateway = &self.gateway;
        let releases = indices
            .iter()
            .filter_map(|&index| vault.secret(index).map(|secret| (index, secret)))
            .map(|(index, secret)| async move {
                (index, gateway.submit_secret(order_hash, secret).await)
            });

        for (index, result) in join_all(releases).await {
            match result {
                Ok(()) => {
                    info!(index, "[swap] Shared secret for fill index");
                    report.revealed.insert(index);
                }
                Err(e) => {
                    report.release_failures += 1;
                    warn!(index, error = %e, "[swap] Error submitting secret");
                }
            }
        }
        self.transition(SchedulerState::Polling);

        None
    }

    fn transition(&mut self, next: SchedulerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid scheduler transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    fn cancelled(mut report: RevealReport) -> RevealReport {
        info!(
            iterations = report.iterations,
            revealed = report.revealed.len(),
            "[swap] Shutdown signal received, reveal loop stopped"
        );
        report.exit = RevealExit::Cancelled;
        report
    }
}

/// True once `true` was sent or the sender was dropped.
pub(crate) fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Distinct ready fill indices that address an existing secret, ascending.
fn releasable_indices(ready: &ReadyFills, secrets_count: usize) -> BTreeSet<usize> {
    ready
        .fills
        .iter()
        .filter(|fill| fill.status == FillStatus::ReadyToAcceptSecret)
        .filter_map(|fill| {
            if invariant_fill_index_in_range(fill.index, secrets_count) {
                Some(fill.index)
            } else {
                warn!(
                    index = fill.index,
                    secrets_count, "[swap] Fill index outside secret set, skipping"
                );
                None
            }
        })
        .collect()
}
