//! # Domain Invariants
//!
//! Business rules that hold for every swap attempt.

use sha3::{Digest, Keccak256};

use super::entities::HashLock;
use super::errors::{Hash, SwapError};
use super::secure_secret::Secret;

/// Invariant: the secret set matches the preset.
///
/// `len(secrets) == secretsCount` and the set is never empty.
pub fn invariant_secret_count(got: usize, expected: usize) -> Result<(), SwapError> {
    if got == 0 || got != expected {
        return Err(SwapError::InvalidSecretCount { expected, got });
    }
    Ok(())
}

/// Invariant: the hashlock variant is a function of the secret count.
///
/// One secret gives `Single`, more give `Multi` with one leaf per secret.
pub fn invariant_hashlock_variant(lock: &HashLock, secrets_count: usize) -> bool {
    match lock {
        HashLock::Single(_) => secrets_count == 1,
        HashLock::Multi { leaves, .. } => secrets_count > 1 && leaves.len() == secrets_count,
    }
}

/// Invariant: a fill index addresses an existing secret.
pub fn invariant_fill_index_in_range(index: usize, secrets_count: usize) -> bool {
    index < secrets_count
}

/// Invariant: keccak256(secret) must equal the committed secret hash.
pub fn invariant_secret_matches(secret: &Secret, secret_hash: &Hash) -> bool {
    let digest: Hash = Keccak256::digest(secret.as_bytes()).into();
    digest == *secret_hash
}
