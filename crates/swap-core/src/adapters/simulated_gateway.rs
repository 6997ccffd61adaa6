//! Simulated Counterparty Gateway
//!
//! Implements `SwapGateway` as an in-memory counterparty network: it quotes,
//! builds and signs orders, and plays a resolver that asks for secrets one
//! fill at a time.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use primitive_types::U256;
use sha3::{Digest, Keccak256};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::algorithms::{hash_secret, HashlockBuilder};
use crate::domain::{
    ChainId, CreatedOrder, FillRequest, GatewayError, Hash, Order, OrderRequest,
    OrderStatusReport, Preset, PresetInfo, Quote, QuoteParams, ReadyFills, Secret, SwapStatus,
};
use crate::ports::{Ledger, SwapGateway};

/// Behaviour of the simulated network.
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Secrets required per preset.
    pub secrets_per_preset: BTreeMap<Preset, usize>,
    /// Quote validity window.
    pub quote_validity: Duration,
    /// Auction length advertised for every preset.
    pub auction_duration_secs: u64,
    /// Destination units paid per source unit.
    pub rate: U256,
    /// `ready_fills` polls between two fills becoming ready.
    pub polls_per_fill: u32,
    /// Force `Expired` after this many `ready_fills` polls.
    pub expire_after_polls: Option<u32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let secrets_per_preset = [(Preset::Fast, 1), (Preset::Medium, 2), (Preset::Slow, 4)]
            .into_iter()
            .collect();
        Self {
            secrets_per_preset,
            quote_validity: Duration::from_secs(60),
            auction_duration_secs: 180,
            rate: U256::one(),
            polls_per_fill: 1,
            expire_after_polls: None,
        }
    }
}

/// Per-order resolver state.
struct SimulatedOrder {
    order: Order,
    status: SwapStatus,
    submitted: bool,
    /// Fill indices not yet requested, in request order.
    pending: VecDeque<usize>,
    /// Requested and waiting for a secret.
    ready: BTreeSet<usize>,
    /// Secret accepted.
    filled: BTreeSet<usize>,
    polls: u32,
}

impl SimulatedOrder {
    fn report(&self, order_hash: Hash) -> OrderStatusReport {
        let fills = self
            .ready
            .iter()
            .map(|index| FillRequest::ready(*index))
            .collect();
        OrderStatusReport {
            order_hash,
            status: self.status,
            fills,
        }
    }
}

/// In-memory counterparty network.
///
/// In production, this would be the HTTP client of the counterparty service.
pub struct SimulatedGateway {
    config: SimulationConfig,
    ledger: Arc<dyn Ledger>,
    signing_key: Zeroizing<[u8; 32]>,
    quotes: RwLock<HashMap<String, Quote>>,
    orders: RwLock<HashMap<Hash, SimulatedOrder>>,
    next_salt: AtomicU64,
}

impl SimulatedGateway {
    /// Create a gateway that signs orders with `signing_key` through `ledger`.
    pub fn new(config: SimulationConfig, ledger: Arc<dyn Ledger>, signing_key: [u8; 32]) -> Self {
        Self {
            config,
            ledger,
            signing_key: Zeroizing::new(signing_key),
            quotes: RwLock::new(HashMap::new()),
            orders: RwLock::new(HashMap::new()),
            next_salt: AtomicU64::new(1),
        }
    }

    /// Current status of a known order.
    pub fn status_of(&self, order_hash: &Hash) -> Option<SwapStatus> {
        self.orders.read().get(order_hash).map(|o| o.status)
    }

    /// Fill indices whose secret was accepted.
    pub fn filled_indices(&self, order_hash: &Hash) -> BTreeSet<usize> {
        self.orders
            .read()
            .get(order_hash)
            .map(|o| o.filled.clone())
            .unwrap_or_default()
    }

    /// Number of quotes still held.
    pub fn quote_count(&self) -> usize {
        self.quotes.read().len()
    }

    /// Number of orders created.
    pub fn order_count(&self) -> usize {
        self.orders.read().len()
    }
}

/// keccak256 over the order fields, excluding the signature.
pub fn order_hash(order: &Order) -> Hash {
    let mut hasher = Keccak256::new();
    let mut word = [0u8; 32];

    hasher.update(order.maker);
    hasher.update(order.src_chain.id().to_be_bytes());
    hasher.update(order.dst_chain.id().to_be_bytes());
    hasher.update(order.src_token);
    hasher.update(order.dst_token);
    order.making_amount.to_big_endian(&mut word);
    hasher.update(word);
    order.taking_amount.to_big_endian(&mut word);
    hasher.update(word);
    hasher.update(order.hash_lock.value());
    hasher.update(order.salt.to_be_bytes());

    hasher.finalize().into()
}

#[async_trait]
impl SwapGateway for SimulatedGateway {
    async fn quote(&self, params: &QuoteParams) -> Result<Quote, GatewayError> {
        if params.amount.is_zero() {
            return Err(GatewayError::Rejected("amount must be positive".to_string()));
        }
        if params.src_chain == params.dst_chain {
            return Err(GatewayError::Rejected(
                "source and destination chain must differ".to_string(),
            ));
        }

        let dst_amount = params
            .amount
            .checked_mul(self.config.rate)
            .ok_or_else(|| GatewayError::Rejected("amount overflow".to_string()))?;

        let presets = self
            .config
            .secrets_per_preset
            .iter()
            .map(|(preset, count)| {
                (
                    *preset,
                    PresetInfo {
                        secrets_count: *count,
                        auction_duration_secs: self.config.auction_duration_secs,
                        start_amount: dst_amount,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();
        let recommended_preset = presets.keys().next().copied().unwrap_or(Preset::Fast);

        let validity = chrono::Duration::from_std(self.config.quote_validity)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));
        let quote = Quote {
            quote_id: Uuid::new_v4().to_string(),
            params: params.clone(),
            src_token_amount: params.amount,
            dst_token_amount: dst_amount,
            presets,
            recommended_preset,
            expires_at: Utc::now() + validity,
        };

        debug!(quote_id = %quote.quote_id, "[swap] Simulated quote issued");
        let mut quotes = self.quotes.write();
        let now = Utc::now();
        quotes.retain(|_, q| !q.is_expired_at(now));
        quotes.insert(quote.quote_id.clone(), quote.clone());
        Ok(quote)
    }

    async fn create_order(
        &self,
        quote: &Quote,
        request: &OrderRequest,
    ) -> Result<CreatedOrder, GatewayError> {
        if !self.quotes.read().contains_key(&quote.quote_id) {
            return Err(GatewayError::Rejected(format!(
                "unknown quote {}",
                quote.quote_id
            )));
        }
        if quote.is_expired_at(Utc::now()) {
            return Err(GatewayError::Rejected("quote expired".to_string()));
        }

        let expected = quote
            .preset(request.preset)
            .map(|p| p.secrets_count)
            .ok_or_else(|| GatewayError::Rejected(format!("preset {} unavailable", request.preset)))?;
        if request.secret_hashes.len() != expected
            || request.hash_lock.secrets_count() != expected
        {
            return Err(GatewayError::Rejected(format!(
                "expected {} secret hashes, got {}",
                expected,
                request.secret_hashes.len()
            )));
        }

        let mut order = Order {
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
            salt: self.next_salt.fetch_add(1, Ordering::Relaxed),
            signature: Vec::new(),
        };
        let hash = order_hash(&order);
        order.signature = self
            .ledger
            .sign(&hash, &self.signing_key)
            .map_err(|e| GatewayError::Rejected(e.to_string()))?;

        self.orders.write().insert(
            hash,
            SimulatedOrder {
                order: order.clone(),
                status: SwapStatus::Pending,
                submitted: false,
                pending: VecDeque::new(),
                ready: BTreeSet::new(),
                filled: BTreeSet::new(),
                polls: 0,
            },
        );

        Ok(CreatedOrder {
            order,
            order_hash: hash,
            quote_id: quote.quote_id.clone(),
        })
    }

    async fn order_status(&self, order_hash: &Hash) -> Result<OrderStatusReport, GatewayError> {
        self.orders
            .read()
            .get(order_hash)
            .map(|o| o.report(*order_hash))
            .ok_or(GatewayError::NotFound(*order_hash))
    }

    async fn ready_fills(&self, order_hash: &Hash) -> Result<ReadyFills, GatewayError> {
        let mut orders = self.orders.write();
        let sim = orders
            .get_mut(order_hash)
            .ok_or(GatewayError::NotFound(*order_hash))?;

        if !sim.submitted || sim.status.is_terminal() {
            return Ok(ReadyFills::default());
        }

        sim.polls += 1;
        if let Some(limit) = self.config.expire_after_polls {
            if sim.polls >= limit {
                warn!(order_hash = %hex::encode(order_hash), "[swap] Simulated order expired");
                sim.status = SwapStatus::Expired;
                sim.ready.clear();
                return Ok(ReadyFills::default());
            }
        }

        if sim.polls % self.config.polls_per_fill.max(1) == 0 {
            if let Some(index) = sim.pending.pop_front() {
                debug!(index, "[swap] Simulated resolver requests secret");
                sim.ready.insert(index);
            }
        }

        Ok(ReadyFills {
            fills: sim.ready.iter().map(|i| FillRequest::ready(*i)).collect(),
        })
    }

    async fn submit_secret(&self, order_hash: &Hash, secret: &Secret) -> Result<(), GatewayError> {
        let mut orders = self.orders.write();
        let sim = orders
            .get_mut(order_hash)
            .ok_or(GatewayError::NotFound(*order_hash))?;

        let secret_hash = hash_secret(secret);
        let index = sim
            .order
            .secret_hashes
            .iter()
            .position(|h| *h == secret_hash)
            .ok_or_else(|| GatewayError::Rejected("secret does not match order".to_string()))?;

        if sim.filled.contains(&index) {
            return Ok(());
        }
        if !sim.ready.contains(&index) {
            return Err(GatewayError::Rejected(format!(
                "fill {} is not waiting for a secret",
                index
            )));
        }

        let proof = HashlockBuilder::proof(&sim.order.hash_lock, index).unwrap_or_default();
        if !HashlockBuilder::verify_fill(&sim.order.hash_lock, index, &secret_hash, &proof) {
            return Err(GatewayError::Rejected(format!(
                "secret for fill {} fails hashlock check",
                index
            )));
        }

        sim.ready.remove(&index);
        sim.filled.insert(index);
        if sim.pending.is_empty() && sim.ready.is_empty() {
            sim.status = SwapStatus::Executed;
            info!(order_hash = %hex::encode(order_hash), "[swap] Simulated order executed");
        }
        Ok(())
    }

    async fn submit_order(
        &self,
        src_chain: ChainId,
        order: &Order,
        quote_id: &str,
        secret_hashes: &[Hash],
    ) -> Result<(), GatewayError> {
        let hash = order_hash(order);
        let mut orders = self.orders.write();
        let sim = orders
            .get_mut(&hash)
            .ok_or(GatewayError::NotFound(hash))?;

        if src_chain != sim.order.src_chain {
            return Err(GatewayError::Rejected("source chain mismatch".to_string()));
        }
        if secret_hashes != sim.order.secret_hashes.as_slice() {
            return Err(GatewayError::Rejected("secret hashes mismatch".to_string()));
        }
        if order.signature != sim.order.signature {
            return Err(GatewayError::Rejected("signature mismatch".to_string()));
        }

        if !sim.submitted {
            sim.submitted = true;
            sim.pending = (0..sim.order.secret_hashes.len()).collect();
            debug!(quote_id, "[swap] Simulated order published to resolvers");
        }
        Ok(())
    }
}
