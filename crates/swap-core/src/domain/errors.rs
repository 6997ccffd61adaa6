//! # Domain Errors
//!
//! Error types for the swap core and its outbound ports.

use thiserror::Error;

use super::value_objects::Preset;

/// Hash type (32-byte keccak-256).
pub type Hash = [u8; 32];

/// Address type (20-byte EVM address).
pub type Address = [u8; 20];

/// Errors reported by a [`SwapGateway`](crate::ports::SwapGateway) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Transport or backend failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The requested order is unknown to the counterparty service.
    #[error("Order not found: 0x{}", hex::encode(.0))]
    NotFound(Hash),

    /// The request reached the service but was refused.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The call did not complete in time.
    #[error("Request timed out")]
    Timeout,
}

/// Errors reported by a [`Ledger`](crate::ports::Ledger) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Signing key material could not be used.
    #[error("Invalid signing key")]
    InvalidKey,

    /// Signing failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Balance lookup failed.
    #[error("Balance query failed: {0}")]
    Balance(String),
}

/// Swap attempt errors.
///
/// Every variant is fatal to the attempt it was raised in. Transient gateway
/// failures inside the reveal loop are logged and never surface as a `SwapError`.
#[derive(Debug, Error)]
pub enum SwapError {
    /// Secure random source unavailable.
    #[error("Secret generation failed: {0}")]
    Generation(String),

    /// Secret set is empty or does not match the preset.
    #[error("Invalid secret count: expected {expected}, got {got}")]
    InvalidSecretCount {
        /// Count required by the preset (0 when no secret was expected at all).
        expected: usize,
        /// Count actually supplied.
        got: usize,
    },

    /// Quote request failed.
    #[error("Quote request failed: {0}")]
    Quote(#[source] GatewayError),

    /// Quote validity window has elapsed.
    #[error("Quote {quote_id} expired")]
    QuoteExpired {
        /// Expired quote id.
        quote_id: String,
    },

    /// Requested preset is absent from the quote.
    #[error("Preset unavailable: {0}")]
    PresetUnavailable(Preset),

    /// Order creation failed.
    #[error("Order creation failed: {0}")]
    OrderCreation(#[source] GatewayError),

    /// Created order could not be found by the counterparty service.
    #[error("Order 0x{} not discoverable after creation: {source}", hex::encode(.order_hash))]
    OrderNotDiscoverable {
        /// Hash of the created order.
        order_hash: Hash,
        /// Lookup failure.
        #[source]
        source: GatewayError,
    },

    /// Order submission failed.
    #[error("Order submission failed: {0}")]
    Submission(#[source] GatewayError),

    /// Shutdown was requested before the order was submitted.
    #[error("Swap cancelled before order submission")]
    Cancelled,

    /// Ledger operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_secret_count_error() {
        let err = SwapError::InvalidSecretCount {
            expected: 3,
            got: 0,
        };
        assert!(err.to_string().contains("expected 3, got 0"));
    }

    #[test]
    fn test_preset_unavailable_error() {
        let err = SwapError::PresetUnavailable(Preset::Slow);
        assert!(err.to_string().contains("slow"));
    }

    #[test]
    fn test_not_discoverable_error_shows_hash() {
        let err = SwapError::OrderNotDiscoverable {
            order_hash: [0xABu8; 32],
            source: GatewayError::NotFound([0xABu8; 32]),
        };
        assert!(err.to_string().contains("0xabab"));
    }

    #[test]
    fn test_gateway_error_source_is_kept() {
        use std::error::Error as _;
        let err = SwapError::Submission(GatewayError::Timeout);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_ledger_error_converts() {
        let err: SwapError = LedgerError::InvalidKey.into();
        assert!(matches!(err, SwapError::Ledger(LedgerError::InvalidKey)));
    }
}
