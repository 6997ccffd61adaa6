//! # Domain Entities
//!
//! Quote, order and hashlock types exchanged with the counterparty service.

use chrono::{DateTime, Utc};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use uuid::Uuid;

use super::errors::{Address, Hash};
use super::value_objects::{ChainId, FillStatus, Preset, SwapStatus};

/// Number of high bits of a multi-fill hashlock that carry the part count.
const PARTS_BITS: u32 = 16;

/// The on-order commitment to the secret set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashLock {
    /// One secret: the commitment is its hash.
    Single(Hash),
    /// Several secrets: Merkle root over the indexed secret hashes.
    Multi {
        /// Merkle root over `leaves`.
        root: Hash,
        /// Ordered Merkle leaves, one per secret.
        leaves: Vec<Hash>,
    },
}

impl HashLock {
    /// The 32-byte value placed on the order.
    ///
    /// For `Multi` the top 16 bits of the root are replaced with
    /// `leaves.len() - 1` so the counterparty can recover the part count.
    pub fn value(&self) -> Hash {
        match self {
            HashLock::Single(hash) => *hash,
            HashLock::Multi { root, leaves } => {
                let parts = (leaves.len().saturating_sub(1) as u64).min((1 << PARTS_BITS) - 1);
                let mut value = *root;
                value[..2].copy_from_slice(&(parts as u16).to_be_bytes());
                value
            }
        }
    }

    /// Number of secrets this lock commits to.
    pub fn secrets_count(&self) -> usize {
        match self {
            HashLock::Single(_) => 1,
            HashLock::Multi { leaves, .. } => leaves.len(),
        }
    }

    /// True for the multi-fill variant.
    pub fn is_multi(&self) -> bool {
        matches!(self, HashLock::Multi { .. })
    }

    /// 0x-prefixed hex of [`value`](Self::value).
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.value()))
    }
}

/// Parameters of a quote request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteParams {
    /// Chain the maker sells on.
    pub src_chain: ChainId,
    /// Chain the maker receives on.
    pub dst_chain: ChainId,
    /// Token sold.
    pub src_token: Address,
    /// Token bought.
    pub dst_token: Address,
    /// Amount of `src_token` in base units.
    pub amount: U256,
    /// Maker wallet.
    pub wallet: Address,
    /// Ask the service to include a fee/amount estimate.
    pub enable_estimate: bool,
}

/// Per-preset quote parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetInfo {
    /// Number of secrets (fill slots) the order needs.
    pub secrets_count: usize,
    /// Auction length.
    pub auction_duration_secs: u64,
    /// Destination amount at auction start.
    pub start_amount: U256,
}

/// Pricing snapshot returned by the counterparty service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Service-side quote identifier.
    pub quote_id: String,
    /// Request this quote answers.
    pub params: QuoteParams,
    /// Amount sold.
    pub src_token_amount: U256,
    /// Estimated amount received.
    pub dst_token_amount: U256,
    /// Available presets.
    pub presets: BTreeMap<Preset, PresetInfo>,
    /// Preset the service recommends.
    pub recommended_preset: Preset,
    /// End of the validity window.
    pub expires_at: DateTime<Utc>,
}

impl Quote {
    /// Look up a preset.
    pub fn preset(&self, preset: Preset) -> Option<&PresetInfo> {
        self.presets.get(&preset)
    }

    /// Source chain of the quoted route.
    pub fn src_chain(&self) -> ChainId {
        self.params.src_chain
    }

    /// Check if the validity window has elapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// What the maker asks the service to build an order from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Maker wallet.
    pub wallet: Address,
    /// Commitment to the secret set.
    pub hash_lock: HashLock,
    /// Chosen preset.
    pub preset: Preset,
    /// Ordered secret hashes, one per fill slot.
    pub secret_hashes: Vec<Hash>,
}

/// A signed cross-chain order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Maker wallet.
    pub maker: Address,
    /// Source chain.
    pub src_chain: ChainId,
    /// Destination chain.
    pub dst_chain: ChainId,
    /// Token sold.
    pub src_token: Address,
    /// Token bought.
    pub dst_token: Address,
    /// Amount sold.
    pub making_amount: U256,
    /// Minimum amount received.
    pub taking_amount: U256,
    /// Commitment to the secret set.
    pub hash_lock: HashLock,
    /// Ordered secret hashes.
    pub secret_hashes: Vec<Hash>,
    /// Preset the auction runs with.
    pub preset: Preset,
    /// Uniqueness salt.
    pub salt: u64,
    /// Maker signature over the order hash (65 bytes, r || s || v).
    pub signature: Vec<u8>,
}

/// Result of a successful order creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    /// The signed order.
    pub order: Order,
    /// Order identifier, used as the polling key.
    pub order_hash: Hash,
    /// Quote the order was built from.
    pub quote_id: String,
}

/// A fill waiting for (or past) its secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillRequest {
    /// Position in the committed secret sequence.
    pub index: usize,
    /// Fill status.
    pub status: FillStatus,
}

impl FillRequest {
    /// A fill ready to accept the secret at `index`.
    pub fn ready(index: usize) -> Self {
        Self {
            index,
            status: FillStatus::ReadyToAcceptSecret,
        }
    }
}

/// Fills currently waiting for a secret.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyFills {
    /// Fill requests.
    pub fills: Vec<FillRequest>,
}

/// Order status snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusReport {
    /// Order the snapshot belongs to.
    pub order_hash: Hash,
    /// Current status.
    pub status: SwapStatus,
    /// Fills known to the service.
    pub fills: Vec<FillRequest>,
}

/// Timing and preset selection for one swap attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwapConfig {
    /// Preset to place the order with.
    pub preset: Preset,
    /// Interval between reveal-loop iterations.
    pub poll_interval: Duration,
    /// Wait between order steps so backend state can propagate.
    pub settle_delay: Duration,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            preset: Preset::Fast,
            poll_interval: Duration::from_secs(5),
            settle_delay: Duration::from_secs(2),
        }
    }
}

/// Why the reveal loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealExit {
    /// A terminal status was observed.
    Terminal(SwapStatus),
    /// The owner signalled shutdown.
    Cancelled,
}

/// Summary of one reveal loop run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealReport {
    /// Exit reason.
    pub exit: RevealExit,
    /// Fill indices whose secret was accepted at least once.
    pub revealed: BTreeSet<usize>,
    /// Completed loop iterations.
    pub iterations: u64,
    /// Failed status or ready-fill queries.
    pub poll_failures: u64,
    /// Failed secret releases.
    pub release_failures: u64,
}

impl RevealReport {
    /// Final status, when the loop ended on one.
    pub fn final_status(&self) -> Option<SwapStatus> {
        match self.exit {
            RevealExit::Terminal(status) => Some(status),
            RevealExit::Cancelled => None,
        }
    }
}

/// Result of a full swap attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// Correlation id of the attempt.
    pub attempt_id: Uuid,
    /// Placed order.
    pub order_hash: Hash,
    /// Quote the order was built from.
    pub quote_id: String,
    /// Secrets committed to.
    pub secrets_count: usize,
    /// Reveal loop summary.
    pub report: RevealReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_hashlock_value_is_hash() {
        let lock = HashLock::Single([7u8; 32]);
        assert_eq!(lock.value(), [7u8; 32]);
        assert_eq!(lock.secrets_count(), 1);
        assert!(!lock.is_multi());
    }

    #[test]
    fn test_multi_hashlock_value_encodes_parts() {
        let lock = HashLock::Multi {
            root: [0xFFu8; 32],
            leaves: vec![[1u8; 32]; 4],
        };
        let value = lock.value();
        assert_eq!(&value[..2], &[0x00, 0x03]);
        assert_eq!(&value[2..], &[0xFFu8; 30]);
        assert_eq!(lock.secrets_count(), 4);
    }

    #[test]
    fn test_quote_expiry() {
        let now = Utc::now();
        let quote = Quote {
            quote_id: "q-1".to_string(),
            params: QuoteParams {
                src_chain: ChainId::Ethereum,
                dst_chain: ChainId::Polygon,
                src_token: [1u8; 20],
                dst_token: [2u8; 20],
                amount: U256::from(1_000u64),
                wallet: [3u8; 20],
                enable_estimate: true,
            },
            src_token_amount: U256::from(1_000u64),
            dst_token_amount: U256::from(50u64),
            presets: BTreeMap::new(),
            recommended_preset: Preset::Fast,
            expires_at: now,
        };
        assert!(quote.is_expired_at(now));
        assert!(!quote.is_expired_at(now - chrono::Duration::seconds(1)));
        assert!(quote.preset(Preset::Fast).is_none());
        assert_eq!(quote.src_chain(), ChainId::Ethereum);
    }

    #[test]
    fn test_swap_config_default() {
        let config = SwapConfig::default();
        assert_eq!(config.preset, Preset::Fast);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.settle_delay, Duration::from_secs(2));
    }
}
