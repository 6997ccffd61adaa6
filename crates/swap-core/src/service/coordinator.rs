//! # Order Coordinator
//!
//! Drives quote -> create -> confirm -> submit against the counterparty
//! service. Steps run strictly in order and any failure ends the attempt.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::scheduler::shutdown_requested;
use crate::domain::{
    format_address, CreatedOrder, OrderRequest, Preset, Quote, QuoteParams, SwapError,
};
use crate::ports::SwapGateway;

/// Places one order and hands it over to the reveal loop.
pub struct OrderCoordinator {
    gateway: Arc<dyn SwapGateway>,
    settle_delay: Duration,
}

impl OrderCoordinator {
    /// Create a coordinator.
    ///
    /// `settle_delay` is awaited before creating, confirming and submitting
    /// the order so backend state can propagate between steps.
    pub fn new(gateway: Arc<dyn SwapGateway>, settle_delay: Duration) -> Self {
        Self {
            gateway,
            settle_delay,
        }
    }

    /// Step 1: request a quote.
    pub async fn request_quote(&self, params: &QuoteParams) -> Result<Quote, SwapError> {
        let quote = self.gateway.quote(params).await.map_err(SwapError::Quote)?;
        info!(
            quote_id = %quote.quote_id,
            src_chain = %quote.params.src_chain,
            dst_chain = %quote.params.dst_chain,
            src_amount = %quote.src_token_amount,
            dst_amount = %quote.dst_token_amount,
            recommended = %quote.recommended_preset,
            "[swap] Quote received"
        );
        Ok(quote)
    }

    /// Step 2: secrets required by `preset`.
    pub fn secrets_count(quote: &Quote, preset: Preset) -> Result<usize, SwapError> {
        let info = quote
            .preset(preset)
            .ok_or(SwapError::PresetUnavailable(preset))?;
        if info.secrets_count == 0 {
            return Err(SwapError::InvalidSecretCount {
                expected: 1,
                got: 0,
            });
        }
        Ok(info.secrets_count)
    }

    /// Steps 3 to 5: create the order, confirm the service can find it, then
    /// submit it.
    ///
    /// A created order that cannot be looked up is abandoned, never submitted.
    /// Shutdown is checked before creation and again before submission; once
    /// requested, nothing further is sent.
    pub async fn place_order(
        &self,
        quote: &Quote,
        request: &OrderRequest,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<CreatedOrder, SwapError> {
        self.settle().await;
        if shutdown_requested(shutdown) {
            return Err(SwapError::Cancelled);
        }
        if quote.is_expired_at(Utc::now()) {
            return Err(SwapError::QuoteExpired {
                quote_id: quote.quote_id.clone(),
            });
        }

        let created = self.create_order(quote, request).await?;

        self.settle().await;
        self.confirm_discoverable(&created).await?;

        self.settle().await;
        if shutdown_requested(shutdown) {
            warn!(
                order_hash = %hex::encode(created.order_hash),
                "[swap] Shutdown requested, order created but not submitted"
            );
            return Err(SwapError::Cancelled);
        }
        self.gateway
            .submit_order(
                quote.src_chain(),
                &created.order,
                &created.quote_id,
                &request.secret_hashes,
            )
            .await
            .map_err(SwapError::Submission)?;
        info!(
            order_hash = %hex::encode(created.order_hash),
            "[swap] Order submitted"
        );

        Ok(created)
    }

    async fn create_order(
        &self,
        quote: &Quote,
        request: &OrderRequest,
    ) -> Result<CreatedOrder, SwapError> {
        info!(
            wallet = %format_address(&request.wallet),
            hash_lock = %request.hash_lock.to_hex(),
            secret_hashes = %serde_json::json!(request
                .secret_hashes
                .iter()
                .map(|h| format!("0x{}", hex::encode(h)))
                .collect::<Vec<_>>()),
            "[swap] Placing order"
        );

        let created = self
            .gateway
            .create_order(quote, request)
            .await
            .map_err(SwapError::OrderCreation)?;
        info!(
            order_hash = %hex::encode(created.order_hash),
            quote_id = %created.quote_id,
            "[swap] Order created"
        );
        Ok(created)
    }

    async fn confirm_discoverable(&self, created: &CreatedOrder) -> Result<(), SwapError> {
        match self.gateway.order_status(&created.order_hash).await {
            Ok(report) => {
                info!(
                    order_hash = %hex::encode(created.order_hash),
                    status = %report.status,
                    "[swap] Order found by counterparty service"
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    order_hash = %hex::encode(created.order_hash),
                    error = %source,
                    "[swap] Order not found, abandoning attempt without submitting"
                );
                Err(SwapError::OrderNotDiscoverable {
                    order_hash: created.order_hash,
                    source,
                })
            }
        }
    }

    async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}
