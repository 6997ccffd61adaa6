//! In-Memory Ledger Adapter
//!
//! Implements the `Ledger` port with a balance table and local secp256k1
//! signing.

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use parking_lot::RwLock;
use primitive_types::U256;
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::{format_address, Address, LedgerError};
use crate::ports::Ledger;

/// Ledger backed by an in-memory balance table.
///
/// In production, balances come from an RPC node; signing stays local.
pub struct InMemoryLedger {
    /// (owner, asset) -> balance.
    balances: RwLock<HashMap<(Address, Address), U256>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
        }
    }

    /// Builder-style balance seeding.
    pub fn with_balance(self, owner: Address, asset: Address, amount: U256) -> Self {
        self.set_balance(owner, asset, amount);
        self
    }

    /// Set a balance.
    pub fn set_balance(&self, owner: Address, asset: Address, amount: U256) {
        self.balances.write().insert((owner, asset), amount);
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// EVM address controlled by a secp256k1 private key.
pub fn address_from_key(key: &[u8; 32]) -> Result<Address, LedgerError> {
    let signing_key = SigningKey::from_bytes(key.into()).map_err(|_| LedgerError::InvalidKey)?;
    let point = signing_key.verifying_key().to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    Ok(address)
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn balance_of(&self, owner: &Address, asset: &Address) -> Result<U256, LedgerError> {
        debug!(
            owner = %format_address(owner),
            asset = %format_address(asset),
            "[swap] Balance lookup"
        );
        Ok(self
            .balances
            .read()
            .get(&(*owner, *asset))
            .copied()
            .unwrap_or_default())
    }

    fn sign(&self, payload: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, LedgerError> {
        let signing_key =
            SigningKey::from_bytes(key.into()).map_err(|_| LedgerError::InvalidKey)?;
        let digest = Keccak256::digest(payload);
        let (signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| LedgerError::Signing(e.to_string()))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        Ok(bytes)
    }
}
