//! # Hashlock Builder
//!
//! Derives the order commitment from the secret set.

use tracing::debug;

use super::merkle::{merkle_leaf, SecretMerkleTree};
use super::secret::hash_secret;
use crate::domain::{Hash, HashLock, Secret, SwapError};

/// Builds single-fill and multi-fill hashlocks.
pub struct HashlockBuilder;

impl HashlockBuilder {
    /// Build the hashlock for an ordered secret sequence.
    ///
    /// - one secret: `Single(keccak256(secret))`
    /// - more: `Multi` over the indexed Merkle leaves
    pub fn build(secrets: &[Secret]) -> Result<HashLock, SwapError> {
        match secrets {
            [] => Err(SwapError::InvalidSecretCount {
                expected: 1,
                got: 0,
            }),
            [secret] => Ok(Self::for_single_fill(secret)),
            _ => {
                let hashes: Vec<Hash> = secrets.iter().map(hash_secret).collect();
                Self::for_multiple_fills(&hashes)
            }
        }
    }

    /// Single-fill hashlock.
    pub fn for_single_fill(secret: &Secret) -> HashLock {
        HashLock::Single(hash_secret(secret))
    }

    /// Multi-fill hashlock from ordered secret hashes (at least two).
    pub fn for_multiple_fills(secret_hashes: &[Hash]) -> Result<HashLock, SwapError> {
        if secret_hashes.len() < 2 {
            return Err(SwapError::InvalidSecretCount {
                expected: 2,
                got: secret_hashes.len(),
            });
        }

        let leaves = Self::merkle_leaves(secret_hashes);
        let tree = SecretMerkleTree::build(leaves);
        debug!(
            leaves = tree.leaf_count(),
            root = %hex::encode(tree.root()),
            "[swap] Built multi-fill hashlock"
        );

        Ok(HashLock::Multi {
            root: tree.root(),
            leaves: tree.leaves().to_vec(),
        })
    }

    /// Indexed Merkle leaves for ordered secret hashes.
    pub fn merkle_leaves(secret_hashes: &[Hash]) -> Vec<Hash> {
        secret_hashes
            .iter()
            .enumerate()
            .map(|(index, hash)| merkle_leaf(index, hash))
            .collect()
    }

    /// Inclusion proof for fill `index` of a multi-fill lock.
    ///
    /// `None` for single-fill locks and out-of-range indices.
    pub fn proof(lock: &HashLock, index: usize) -> Option<Vec<Hash>> {
        match lock {
            HashLock::Single(_) => None,
            HashLock::Multi { leaves, .. } => SecretMerkleTree::build(leaves.clone()).proof(index),
        }
    }

    /// Check that `secret_hash` is the committed hash for fill `index`.
    pub fn verify_fill(lock: &HashLock, index: usize, secret_hash: &Hash, proof: &[Hash]) -> bool {
        match lock {
            HashLock::Single(hash) => index == 0 && hash == secret_hash,
            HashLock::Multi { root, .. } => {
                SecretMerkleTree::verify(&merkle_leaf(index, secret_hash), proof, root)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::SecretVault;
    use crate::domain::invariant_hashlock_variant;

    fn fixed_secrets(n: u8) -> Vec<Secret> {
        (0..n).map(|i| Secret::new([i + 1; 32])).collect()
    }

    #[test]
    fn test_empty_fails() {
        assert!(matches!(
            HashlockBuilder::build(&[]),
            Err(SwapError::InvalidSecretCount { got: 0, .. })
        ));
    }

    #[test]
    fn test_one_secret_is_single() {
        let secrets = fixed_secrets(1);
        let lock = HashlockBuilder::build(&secrets).unwrap();
        assert_eq!(lock, HashLock::Single(hash_secret(&secrets[0])));
    }

    #[test]
    fn test_many_secrets_is_multi() {
        for n in 2..=8u8 {
            let lock = HashlockBuilder::build(&fixed_secrets(n)).unwrap();
            match &lock {
                HashLock::Multi { leaves, .. } => assert_eq!(leaves.len(), n as usize),
                HashLock::Single(_) => panic!("expected multi-fill lock for {} secrets", n),
            }
            assert!(invariant_hashlock_variant(&lock, n as usize));
        }
    }

    #[test]
    fn test_build_deterministic() {
        let a = HashlockBuilder::build(&fixed_secrets(4)).unwrap();
        let b = HashlockBuilder::build(&fixed_secrets(4)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.value(), b.value());
    }

    #[test]
    fn test_order_matters() {
        let mut reversed = fixed_secrets(3);
        reversed.reverse();
        let a = HashlockBuilder::build(&fixed_secrets(3)).unwrap();
        let b = HashlockBuilder::build(&reversed).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_multiple_fills_needs_two() {
        assert!(HashlockBuilder::for_multiple_fills(&[[1u8; 32]]).is_err());
    }

    #[test]
    fn test_proof_per_fill_verifies() {
        let vault = SecretVault::generate(5).unwrap();
        let lock = HashlockBuilder::build(vault.secrets()).unwrap();
        for (index, hash) in vault.secret_hashes().iter().enumerate() {
            let proof = HashlockBuilder::proof(&lock, index).unwrap();
            assert!(HashlockBuilder::verify_fill(&lock, index, hash, &proof));
        }
        let proof = HashlockBuilder::proof(&lock, 1).unwrap();
        assert!(!HashlockBuilder::verify_fill(
            &lock,
            2,
            &vault.secret_hashes()[1],
            &proof
        ));
    }

    #[test]
    fn test_single_fill_verification() {
        let secrets = fixed_secrets(1);
        let lock = HashlockBuilder::build(&secrets).unwrap();
        let hash = hash_secret(&secrets[0]);
        assert!(HashlockBuilder::proof(&lock, 0).is_none());
        assert!(HashlockBuilder::verify_fill(&lock, 0, &hash, &[]));
        assert!(!HashlockBuilder::verify_fill(&lock, 1, &hash, &[]));
    }
}
