//! # Secret Vault
//!
//! Generation and custody of the swap's hashlock preimages.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::domain::{invariant_secret_matches, Hash, Secret, SwapError, SECRET_LEN};

/// Upper bound on secrets per attempt. The part count travels in 16 bits of the
/// multi-fill hashlock.
pub const MAX_SECRETS: usize = 1 << 16;

/// Hash a secret with keccak-256.
pub fn hash_secret(secret: &Secret) -> Hash {
    Keccak256::digest(secret.as_bytes()).into()
}

/// Verify that a secret matches a committed hash.
pub fn verify_secret(secret: &Secret, secret_hash: &Hash) -> bool {
    invariant_secret_matches(secret, secret_hash)
}

/// Owns every secret of one swap attempt, together with its hash.
///
/// The sequence is fixed at construction and never mutated; position `i` is
/// the secret for fill index `i`.
pub struct SecretVault {
    secrets: Vec<Secret>,
    hashes: Vec<Hash>,
}

impl SecretVault {
    /// Generate `count` secrets from the operating system CSPRNG.
    pub fn generate(count: usize) -> Result<Self, SwapError> {
        Self::generate_with(&mut OsRng, count)
    }

    /// Generate `count` secrets from a caller-supplied CSPRNG.
    pub fn generate_with<R>(rng: &mut R, count: usize) -> Result<Self, SwapError>
    where
        R: RngCore + CryptoRng,
    {
        if count == 0 || count > MAX_SECRETS {
            return Err(SwapError::InvalidSecretCount {
                expected: count.clamp(1, MAX_SECRETS),
                got: count,
            });
        }

        let mut secrets = Vec::with_capacity(count);
        for _ in 0..count {
            let mut bytes = [0u8; SECRET_LEN];
            rng.try_fill_bytes(&mut bytes)
                .map_err(|e| SwapError::Generation(e.to_string()))?;
            secrets.push(Secret::new(bytes));
        }

        debug!(count, "[swap] Generated secrets");
        Ok(Self::from_secrets_unchecked(secrets))
    }

    /// Take ownership of an existing secret sequence.
    pub fn from_secrets(secrets: Vec<Secret>) -> Result<Self, SwapError> {
        if secrets.is_empty() || secrets.len() > MAX_SECRETS {
            return Err(SwapError::InvalidSecretCount {
                expected: secrets.len().clamp(1, MAX_SECRETS),
                got: secrets.len(),
            });
        }
        Ok(Self::from_secrets_unchecked(secrets))
    }

    fn from_secrets_unchecked(secrets: Vec<Secret>) -> Self {
        let hashes = secrets.iter().map(hash_secret).collect();
        Self { secrets, hashes }
    }

    /// Number of secrets.
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Always false for a constructed vault.
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Secret for fill `index`.
    pub fn secret(&self, index: usize) -> Option<&Secret> {
        self.secrets.get(index)
    }

    /// All secrets, in fill order.
    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    /// Hash of the secret for fill `index`.
    pub fn secret_hash(&self, index: usize) -> Option<&Hash> {
        self.hashes.get(index)
    }

    /// All secret hashes, in fill order.
    pub fn secret_hashes(&self) -> &[Hash] {
        &self.hashes
    }
}

impl std::fmt::Debug for SecretVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretVault")
            .field("len", &self.secrets.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn test_generate_exact_count() {
        let vault = SecretVault::generate(5).unwrap();
        assert_eq!(vault.len(), 5);
        assert_eq!(vault.secret_hashes().len(), 5);
        assert!(vault.secret(4).is_some());
        assert!(vault.secret(5).is_none());
    }

    #[test]
    fn test_generate_thousand_distinct() {
        let vault = SecretVault::generate(1000).unwrap();
        let distinct: HashSet<[u8; 32]> = vault.secrets().iter().map(|s| *s.as_bytes()).collect();
        assert_eq!(distinct.len(), 1000);
    }

    #[test]
    fn test_generate_zero_fails() {
        let result = SecretVault::generate(0);
        assert!(matches!(
            result,
            Err(SwapError::InvalidSecretCount { got: 0, .. })
        ));
    }

    #[test]
    fn test_generate_rng_failure() {
        let result = SecretVault::generate_with(&mut BrokenRng, 2);
        assert!(matches!(result, Err(SwapError::Generation(_))));
    }

    #[test]
    fn test_hashes_follow_secret_order() {
        let vault = SecretVault::from_secrets(vec![
            Secret::new([1u8; 32]),
            Secret::new([2u8; 32]),
        ])
        .unwrap();
        assert_eq!(vault.secret_hash(0), Some(&hash_secret(&Secret::new([1u8; 32]))));
        assert_eq!(vault.secret_hash(1), Some(&hash_secret(&Secret::new([2u8; 32]))));
    }

    #[test]
    fn test_hash_secret_deterministic() {
        let secret = Secret::new([0xABu8; 32]);
        assert_eq!(hash_secret(&secret), hash_secret(&secret));
        assert_ne!(hash_secret(&secret), hash_secret(&Secret::new([0xCDu8; 32])));
    }

    #[test]
    fn test_verify_secret() {
        let vault = SecretVault::generate(1).unwrap();
        let secret = vault.secret(0).unwrap();
        assert!(verify_secret(secret, &vault.secret_hashes()[0]));
        assert!(!verify_secret(secret, &[0u8; 32]));
    }

    #[test]
    fn test_debug_does_not_leak() {
        let vault = SecretVault::from_secrets(vec![Secret::new([0xEEu8; 32])]).unwrap();
        let debug = format!("{:?}", vault);
        assert!(!debug.contains("ee"));
        assert!(debug.contains("len: 1"));
    }
}
