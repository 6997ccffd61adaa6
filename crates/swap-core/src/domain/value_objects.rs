//! # Domain Value Objects
//!
//! Immutable value types: chains, presets and the two state machines
//! (order status as reported by the counterparty, and the reveal scheduler).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::Address;

/// Supported EVM chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChainId {
    /// Ethereum mainnet.
    Ethereum,
    /// BNB Smart Chain.
    Bsc,
    /// Polygon PoS.
    Polygon,
    /// Optimism.
    Optimism,
    /// Arbitrum One.
    Arbitrum,
    /// Base.
    Base,
    /// Avalanche C-Chain.
    Avalanche,
}

impl ChainId {
    /// EIP-155 chain id.
    pub fn id(&self) -> u64 {
        match self {
            ChainId::Ethereum => 1,
            ChainId::Bsc => 56,
            ChainId::Polygon => 137,
            ChainId::Optimism => 10,
            ChainId::Arbitrum => 42161,
            ChainId::Base => 8453,
            ChainId::Avalanche => 43114,
        }
    }

    /// Look up a chain by EIP-155 id.
    pub fn from_id(id: u64) -> Option<Self> {
        [
            ChainId::Ethereum,
            ChainId::Bsc,
            ChainId::Polygon,
            ChainId::Optimism,
            ChainId::Arbitrum,
            ChainId::Base,
            ChainId::Avalanche,
        ]
        .into_iter()
        .find(|chain| chain.id() == id)
    }

    fn name(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "ethereum",
            ChainId::Bsc => "bsc",
            ChainId::Polygon => "polygon",
            ChainId::Optimism => "optimism",
            ChainId::Arbitrum => "arbitrum",
            ChainId::Base => "base",
            ChainId::Avalanche => "avalanche",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChainId {
    type Err = String;

    /// Accepts a chain name (`polygon`) or its numeric id (`137`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u64>() {
            return Self::from_id(id).ok_or_else(|| format!("unsupported chain id {id}"));
        }
        match s.to_ascii_lowercase().as_str() {
            "ethereum" | "mainnet" => Ok(ChainId::Ethereum),
            "bsc" => Ok(ChainId::Bsc),
            "polygon" => Ok(ChainId::Polygon),
            "optimism" => Ok(ChainId::Optimism),
            "arbitrum" => Ok(ChainId::Arbitrum),
            "base" => Ok(ChainId::Base),
            "avalanche" => Ok(ChainId::Avalanche),
            other => Err(format!("unsupported chain {other}")),
        }
    }
}

/// Named quote configuration. Determines auction speed and how many secrets
/// the order needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Short auction.
    Fast,
    /// Medium auction.
    Medium,
    /// Long auction.
    Slow,
    /// Caller-defined auction.
    Custom,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Fast => "fast",
            Preset::Medium => "medium",
            Preset::Slow => "slow",
            Preset::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Preset::Fast),
            "medium" => Ok(Preset::Medium),
            "slow" => Ok(Preset::Slow),
            "custom" => Ok(Preset::Custom),
            other => Err(format!("unknown preset {other}")),
        }
    }
}

/// Order status as reported by the counterparty service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    /// Live order, fills may still arrive.
    #[default]
    Pending,
    /// Escrows are being refunded.
    Refunding,
    /// All fills settled.
    Executed,
    /// Auction window closed.
    Expired,
    /// Escrows returned to their owners.
    Refunded,
}

impl SwapStatus {
    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::Expired | Self::Refunded)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Refunding => "refunding",
            SwapStatus::Executed => "executed",
            SwapStatus::Expired => "expired",
            SwapStatus::Refunded => "refunded",
        };
        f.write_str(name)
    }
}

/// Status of a single fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillStatus {
    /// Escrows deployed on both chains, waiting for the secret.
    #[default]
    ReadyToAcceptSecret,
    /// Escrows not yet finalized.
    Pending,
    /// Secret received and fill settled.
    Executed,
}

/// Reveal scheduler state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    /// Waiting for the next status poll.
    #[default]
    Polling,
    /// Releasing secrets for ready fills.
    Revealing,
    /// Terminal status observed, loop finished.
    Terminal,
}

impl SchedulerState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: SchedulerState) -> bool {
        match (self, next) {
            (Self::Polling, Self::Polling) => true,
            (Self::Polling, Self::Revealing) => true,
            (Self::Polling, Self::Terminal) => true,
            (Self::Revealing, Self::Polling) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

/// Parse a 0x-prefixed 20-byte address.
pub fn parse_address(s: &str) -> Option<Address> {
    let raw = s.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).ok()?;
    if bytes.len() != 20 {
        return None;
    }
    let mut address = [0u8; 20];
    address.copy_from_slice(&bytes);
    Some(address)
}

/// Format an address as 0x-prefixed lowercase hex.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}
