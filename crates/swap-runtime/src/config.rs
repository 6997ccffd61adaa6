//! # Runtime Configuration
//!
//! Read once at startup from environment variables.
//!
//! ## Security Requirements
//!
//! - `MAKER_PRIVATE_KEY` must derive `MAKER_ADDRESS`
//! - The private key and API key are zeroized on drop and never printed

use std::fmt;
use std::time::Duration;

use primitive_types::U256;
use swap_core::{
    address_from_key, format_address, parse_address, service::MAX_POLL_INTERVAL, Address,
    ChainId, Preset, QuoteParams, SwapConfig,
};
use thiserror::Error;
use zeroize::Zeroizing;

/// Default counterparty service endpoint.
pub const DEFAULT_API_URL: &str = "https://api.1inch.dev/fusion-plus";

/// USDC on Ethereum.
pub const DEFAULT_SRC_TOKEN: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

/// LINK on Polygon.
pub const DEFAULT_DST_TOKEN: &str = "0x53E0bca35eC356BD5ddDFebbD1Fc0fD03FaBad39";

/// 1000 USDC in base units.
pub const DEFAULT_AMOUNT: u64 = 1_000_000_000;

/// Upper bound on the wait between order steps.
pub const MAX_SETTLE_DELAY_SECS: u64 = 300;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be used.
    #[error("Invalid value for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The private key controls a different address than configured.
    #[error("MAKER_PRIVATE_KEY controls {derived}, not MAKER_ADDRESS {expected}")]
    KeyAddressMismatch {
        /// Configured address.
        expected: String,
        /// Address derived from the key.
        derived: String,
    },
}

/// Maker identity.
#[derive(Clone)]
pub struct MakerConfig {
    /// Maker wallet.
    pub address: Address,
    /// secp256k1 private key of `address`.
    pub private_key: Zeroizing<[u8; 32]>,
}

impl fmt::Debug for MakerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MakerConfig")
            .field("address", &format_address(&self.address))
            .field("private_key", &"***")
            .finish()
    }
}

/// External endpoints.
#[derive(Clone)]
pub struct EndpointConfig {
    /// Chain RPC node.
    pub node_url: String,
    /// Counterparty service base URL.
    pub api_url: String,
    /// Counterparty service API key.
    pub api_key: Zeroizing<String>,
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("node_url", &self.node_url)
            .field("api_url", &self.api_url)
            .field("api_key", &"***")
            .finish()
    }
}

/// The swap route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Chain the maker sells on.
    pub src_chain: ChainId,
    /// Chain the maker receives on.
    pub dst_chain: ChainId,
    /// Token sold.
    pub src_token: Address,
    /// Token bought.
    pub dst_token: Address,
    /// Amount sold, in base units.
    pub amount: U256,
    /// Decimals of `src_token`, for display.
    pub src_decimals: u8,
}

impl RouteConfig {
    /// Quote request for this route on behalf of `wallet`.
    pub fn quote_params(&self, wallet: Address) -> QuoteParams {
        QuoteParams {
            src_chain: self.src_chain,
            dst_chain: self.dst_chain,
            src_token: self.src_token,
            dst_token: self.dst_token,
            amount: self.amount,
            wallet,
            enable_estimate: true,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maker identity.
    pub maker: MakerConfig,
    /// External endpoints.
    pub endpoints: EndpointConfig,
    /// Swap route.
    pub route: RouteConfig,
    /// Preset and timing.
    pub swap: SwapConfig,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());
        let require = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let private_key = parse_private_key(&Zeroizing::new(require("MAKER_PRIVATE_KEY")?))?;
        let address = parse_addr("MAKER_ADDRESS", &require("MAKER_ADDRESS")?)?;
        let derived = address_from_key(&private_key).map_err(|e| ConfigError::Invalid {
            var: "MAKER_PRIVATE_KEY",
            reason: e.to_string(),
        })?;
        if derived != address {
            return Err(ConfigError::KeyAddressMismatch {
                expected: format_address(&address),
                derived: format_address(&derived),
            });
        }

        let endpoints = EndpointConfig {
            node_url: require("NODE_URL")?,
            api_url: get("SWAP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: Zeroizing::new(require("DEV_PORTAL_API_KEY")?),
        };

        let route = RouteConfig {
            src_chain: parse_or("SWAP_SRC_CHAIN", get("SWAP_SRC_CHAIN"), ChainId::Ethereum)?,
            dst_chain: parse_or("SWAP_DST_CHAIN", get("SWAP_DST_CHAIN"), ChainId::Polygon)?,
            src_token: parse_addr(
                "SWAP_SRC_TOKEN",
                &get("SWAP_SRC_TOKEN").unwrap_or_else(|| DEFAULT_SRC_TOKEN.to_string()),
            )?,
            dst_token: parse_addr(
                "SWAP_DST_TOKEN",
                &get("SWAP_DST_TOKEN").unwrap_or_else(|| DEFAULT_DST_TOKEN.to_string()),
            )?,
            amount: match get("SWAP_AMOUNT") {
                Some(raw) => U256::from_dec_str(raw.trim()).map_err(|e| ConfigError::Invalid {
                    var: "SWAP_AMOUNT",
                    reason: format!("{e:?}"),
                })?,
                None => U256::from(DEFAULT_AMOUNT),
            },
            src_decimals: parse_or("SWAP_SRC_DECIMALS", get("SWAP_SRC_DECIMALS"), 6u8)?,
        };
        if route.amount.is_zero() {
            return Err(ConfigError::Invalid {
                var: "SWAP_AMOUNT",
                reason: "must be positive".to_string(),
            });
        }
        if route.src_chain == route.dst_chain {
            return Err(ConfigError::Invalid {
                var: "SWAP_DST_CHAIN",
                reason: "must differ from SWAP_SRC_CHAIN".to_string(),
            });
        }

        let defaults = SwapConfig::default();
        let poll_secs = parse_or(
            "SWAP_POLL_INTERVAL_SECS",
            get("SWAP_POLL_INTERVAL_SECS"),
            defaults.poll_interval.as_secs(),
        )?;
        if !(1..=MAX_POLL_INTERVAL.as_secs()).contains(&poll_secs) {
            return Err(ConfigError::Invalid {
                var: "SWAP_POLL_INTERVAL_SECS",
                reason: format!("must be between 1 and {}", MAX_POLL_INTERVAL.as_secs()),
            });
        }
        let settle_secs = parse_or(
            "SWAP_SETTLE_DELAY_SECS",
            get("SWAP_SETTLE_DELAY_SECS"),
            defaults.settle_delay.as_secs(),
        )?;
        if settle_secs > MAX_SETTLE_DELAY_SECS {
            return Err(ConfigError::Invalid {
                var: "SWAP_SETTLE_DELAY_SECS",
                reason: format!("must be at most {}", MAX_SETTLE_DELAY_SECS),
            });
        }
        let swap = SwapConfig {
            preset: parse_or("SWAP_PRESET", get("SWAP_PRESET"), defaults.preset)?,
            poll_interval: Duration::from_secs(poll_secs),
            settle_delay: Duration::from_secs(settle_secs),
        };

        Ok(Self {
            maker: MakerConfig {
                address,
                private_key,
            },
            endpoints,
            route,
            swap,
            log_level: get("SWAP_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_private_key(raw: &str) -> Result<Zeroizing<[u8; 32]>, ConfigError> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = Zeroizing::new(hex::decode(raw).map_err(|_| ConfigError::Invalid {
        var: "MAKER_PRIVATE_KEY",
        reason: "not hex".to_string(),
    })?);
    if bytes.len() != 32 {
        return Err(ConfigError::Invalid {
            var: "MAKER_PRIVATE_KEY",
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        });
    }
    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&bytes);
    Ok(key)
}

fn parse_addr(var: &'static str, raw: &str) -> Result<Address, ConfigError> {
    parse_address(raw).ok_or_else(|| ConfigError::Invalid {
        var,
        reason: "expected a 0x-prefixed 20-byte address".to_string(),
    })
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // Private key 1 and the address it controls.
    const KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";
    const ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

    fn env(overrides: &[(&str, &str)]) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = [
            ("MAKER_PRIVATE_KEY", KEY),
            ("MAKER_ADDRESS", ADDRESS),
            ("NODE_URL", "https://eth.example.org"),
            ("DEV_PORTAL_API_KEY", "test-api-key"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in overrides {
            vars.insert(k.to_string(), v.to_string());
        }
        vars
    }

    fn load(vars: HashMap<String, String>) -> Result<RuntimeConfig, ConfigError> {
        RuntimeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(env(&[])).unwrap();
        assert_eq!(config.route.src_chain, ChainId::Ethereum);
        assert_eq!(config.route.dst_chain, ChainId::Polygon);
        assert_eq!(config.route.amount, U256::from(DEFAULT_AMOUNT));
        assert_eq!(config.route.src_decimals, 6);
        assert_eq!(config.swap.preset, Preset::Fast);
        assert_eq!(config.swap.poll_interval, Duration::from_secs(5));
        assert_eq!(config.swap.settle_delay, Duration::from_secs(2));
        assert_eq!(config.endpoints.api_url, DEFAULT_API_URL);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_api_key() {
        let mut vars = env(&[]);
        vars.remove("DEV_PORTAL_API_KEY");
        assert_eq!(
            load(vars).unwrap_err(),
            ConfigError::Missing("DEV_PORTAL_API_KEY")
        );
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        assert_eq!(
            load(env(&[("NODE_URL", "  ")])).unwrap_err(),
            ConfigError::Missing("NODE_URL")
        );
    }

    #[test]
    fn test_key_address_mismatch() {
        let err = load(env(&[(
            "MAKER_ADDRESS",
            "0x0000000000000000000000000000000000000001",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::KeyAddressMismatch { .. }));
    }

    #[test]
    fn test_malformed_key() {
        let err = load(env(&[("MAKER_PRIVATE_KEY", "0x1234")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "MAKER_PRIVATE_KEY",
                ..
            }
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(env(&[
            ("SWAP_SRC_CHAIN", "arbitrum"),
            ("SWAP_DST_CHAIN", "8453"),
            ("SWAP_AMOUNT", "250000000"),
            ("SWAP_PRESET", "slow"),
            ("SWAP_POLL_INTERVAL_SECS", "10"),
            ("SWAP_SETTLE_DELAY_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.route.src_chain, ChainId::Arbitrum);
        assert_eq!(config.route.dst_chain, ChainId::Base);
        assert_eq!(config.route.amount, U256::from(250_000_000u64));
        assert_eq!(config.swap.preset, Preset::Slow);
        assert_eq!(config.swap.poll_interval, Duration::from_secs(10));
        assert_eq!(config.swap.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_rejects_same_chain_and_zero_amount() {
        assert!(load(env(&[("SWAP_DST_CHAIN", "ethereum")])).is_err());
        assert!(load(env(&[("SWAP_AMOUNT", "0")])).is_err());
        assert!(load(env(&[("SWAP_POLL_INTERVAL_SECS", "0")])).is_err());
    }

    #[test]
    fn test_poll_interval_upper_bound() {
        let err = load(env(&[("SWAP_POLL_INTERVAL_SECS", "18446744073709551615")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "SWAP_POLL_INTERVAL_SECS",
                ..
            }
        ));
        assert!(load(env(&[("SWAP_POLL_INTERVAL_SECS", "86400")])).is_ok());
        assert!(load(env(&[("SWAP_POLL_INTERVAL_SECS", "86401")])).is_err());
    }

    #[test]
    fn test_settle_delay_upper_bound() {
        let err = load(env(&[("SWAP_SETTLE_DELAY_SECS", "18446744073709551615")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "SWAP_SETTLE_DELAY_SECS",
                ..
            }
        ));
        assert!(load(env(&[("SWAP_SETTLE_DELAY_SECS", "300")])).is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(env(&[])).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("test-api-key"));
        assert!(!printed.contains("0000000000000000000000000000000000000000000000000000000000000001"));
        assert!(printed.contains("***"));
    }
}
