//! # Outbound Ports
//!
//! Traits for external dependencies: the counterparty swap service and the
//! ledger used for balances and signatures.

use async_trait::async_trait;
use parking_lot::Mutex;
use primitive_types::U256;
use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::algorithms::hash_secret;
use crate::domain::{
    Address, ChainId, CreatedOrder, GatewayError, Hash, LedgerError, Order, OrderRequest,
    OrderStatusReport, Preset, PresetInfo, Quote, QuoteParams, ReadyFills, Secret, SwapStatus,
};

/// Counterparty swap service - outbound port.
///
/// Implementations own transport, authentication and timeouts. Every call is
/// expected to return within a bounded time.
#[async_trait]
pub trait SwapGateway: Send + Sync {
    /// Request a quote.
    async fn quote(&self, params: &QuoteParams) -> Result<Quote, GatewayError>;

    /// Build and sign an order from a quote.
    async fn create_order(
        &self,
        quote: &Quote,
        request: &OrderRequest,
    ) -> Result<CreatedOrder, GatewayError>;

    /// Current status of an order.
    async fn order_status(&self, order_hash: &Hash) -> Result<OrderStatusReport, GatewayError>;

    /// Fills waiting for their secret.
    async fn ready_fills(&self, order_hash: &Hash) -> Result<ReadyFills, GatewayError>;

    /// Release one secret. Accepting the same secret twice has no further effect.
    async fn submit_secret(&self, order_hash: &Hash, secret: &Secret) -> Result<(), GatewayError>;

    /// Publish a created order to resolvers.
    async fn submit_order(
        &self,
        src_chain: ChainId,
        order: &Order,
        quote_id: &str,
        secret_hashes: &[Hash],
    ) -> Result<(), GatewayError>;
}

/// Ledger access - outbound port.
///
/// Used by gateway connectors and the runtime, never by the reveal loop.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Token balance of `owner` in base units.
    async fn balance_of(&self, owner: &Address, asset: &Address) -> Result<U256, LedgerError>;

    /// Recoverable secp256k1 signature (r || s || v) over keccak256(payload).
    fn sign(&self, payload: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, LedgerError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Order hash returned by [`MockSwapGateway::create_order`].
pub const MOCK_ORDER_HASH: Hash = [0xAA; 32];

/// A call observed by [`MockSwapGateway`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    /// `quote`
    Quote,
    /// `create_order`
    CreateOrder,
    /// `order_status`
    OrderStatus,
    /// `ready_fills`
    ReadyFills,
    /// `submit_secret`, identified by the hash of the released secret.
    SubmitSecret(Hash),
    /// `submit_order`
    SubmitOrder,
}

/// Scripted gateway for testing.
///
/// Status and ready-fill responses are consumed front to back; once a script
/// runs dry the fallback response is returned.
pub struct MockSwapGateway {
    secrets_count: usize,
    fail_quote: bool,
    fail_create: bool,
    fail_submit_order: bool,
    statuses: Mutex<VecDeque<Result<SwapStatus, GatewayError>>>,
    fallback_status: SwapStatus,
    ready_fills: Mutex<VecDeque<Result<ReadyFills, GatewayError>>>,
    failing_secrets: HashSet<Hash>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl MockSwapGateway {
    /// Gateway quoting `secrets_count` secrets for every preset.
    pub fn new(secrets_count: usize) -> Self {
        Self {
            secrets_count,
            fail_quote: false,
            fail_create: false,
            fail_submit_order: false,
            statuses: Mutex::new(VecDeque::new()),
            fallback_status: SwapStatus::Pending,
            ready_fills: Mutex::new(VecDeque::new()),
            failing_secrets: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script `order_status` responses.
    pub fn with_statuses(
        self,
        statuses: impl IntoIterator<Item = Result<SwapStatus, GatewayError>>,
    ) -> Self {
        self.statuses.lock().extend(statuses);
        self
    }

    /// Status returned once the script is exhausted.
    pub fn with_fallback_status(mut self, status: SwapStatus) -> Self {
        self.fallback_status = status;
        self
    }

    /// Script `ready_fills` responses.
    pub fn with_ready_fills(
        self,
        fills: impl IntoIterator<Item = Result<ReadyFills, GatewayError>>,
    ) -> Self {
        self.ready_fills.lock().extend(fills);
        self
    }

    /// Reject releases of the secret with this hash.
    pub fn failing_secret(mut self, secret_hash: Hash) -> Self {
        self.failing_secrets.insert(secret_hash);
        self
    }

    /// Fail `quote`.
    pub fn failing_quote(mut self) -> Self {
        self.fail_quote = true;
        self
    }

    /// Fail `create_order`.
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Fail `submit_order`.
    pub fn failing_submit_order(mut self) -> Self {
        self.fail_submit_order = true;
        self
    }

    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    /// Hashes of released secrets, in release order.
    pub fn submitted_secrets(&self) -> Vec<Hash> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                GatewayCall::SubmitSecret(hash) => Some(*hash),
                _ => None,
            })
            .collect()
    }

    /// Number of calls matching `call`.
    pub fn count(&self, call: &GatewayCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl SwapGateway for MockSwapGateway {
    async fn quote(&self, params: &QuoteParams) -> Result<Quote, GatewayError> {
        self.record(GatewayCall::Quote);
        if self.fail_quote {
            return Err(GatewayError::Network("Mock failure".to_string()));
        }

        let presets = [Preset::Fast, Preset::Medium, Preset::Slow]
            .into_iter()
            .map(|preset| {
                (
                    preset,
                    PresetInfo {
                        secrets_count: self.secrets_count,
                        auction_duration_secs: 180,
                        start_amount: params.amount,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        Ok(Quote {
            quote_id: "mock-quote".to_string(),
            params: params.clone(),
            src_token_amount: params.amount,
            dst_token_amount: params.amount,
            presets,
            recommended_preset: Preset::Fast,
            expires_at: chrono::Utc::now() + chrono::Duration::minutes(5),
        })
    }

    async fn create_order(
        &self,
        quote: &Quote,
        request: &OrderRequest,
    ) -> Result<CreatedOrder, GatewayError> {
        self.record(GatewayCall::CreateOrder);
        if self.fail_create {
            return Err(GatewayError::Rejected("Mock failure".to_string()));
        }

        let order = Order {
            maker: request.wallet,
            src_chain: quote.params.src_chain,
            dst_chain: quote.params.dst_chain,
            src_token: quote.params.src_token,
            dst_token: quote.params.dst_token,
            making_amount: quote.src_token_amount,
            taking_amount: quote.dst_token_amount,
            hash_lock: request.hash_lock.clone(),
            secret_hashes: request.secret_hashes.clone(),
            preset: request.preset,
            salt: 1,
            signature: vec![0u8; 65],
        };

        Ok(CreatedOrder {
            order,
            order_hash: MOCK_ORDER_HASH,
            quote_id: quote.quote_id.clone(),
        })
    }

    async fn order_status(&self, order_hash: &Hash) -> Result<OrderStatusReport, GatewayError> {
        self.record(GatewayCall::OrderStatus);
        let status = self
            .statuses
            .lock()
            .pop_front()
            .unwrap_or(Ok(self.fallback_status))?;
        Ok(OrderStatusReport {
            order_hash: *order_hash,
            status,
            fills: Vec::new(),
        })
    }

    async fn ready_fills(&self, _order_hash: &Hash) -> Result<ReadyFills, GatewayError> {
        self.record(GatewayCall::ReadyFills);
        self.ready_fills
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ReadyFills::default()))
    }

    async fn submit_secret(&self, _order_hash: &Hash, secret: &Secret) -> Result<(), GatewayError> {
        let secret_hash = hash_secret(secret);
        self.record(GatewayCall::SubmitSecret(secret_hash));
        if self.failing_secrets.contains(&secret_hash) {
            return Err(GatewayError::Network("Mock failure".to_string()));
        }
        Ok(())
    }

    async fn submit_order(
        &self,
        _src_chain: ChainId,
        _order: &Order,
        _quote_id: &str,
        _secret_hashes: &[Hash],
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::SubmitOrder);
        if self.fail_submit_order {
            return Err(GatewayError::Rejected("Mock failure".to_string()));
        }
        Ok(())
    }
}
