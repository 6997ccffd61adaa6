//! # Secret Merkle Tree
//!
//! Binary Merkle tree over indexed secret hashes, used for multi-fill
//! hashlocks.
//!
//! ALGORITHM: leaf `i` = keccak256(uint64_be(i) || secretHash_i). Leaves are
//! sorted ascending and laid out in a flat array of `2n - 1` nodes, the
//! smallest leaf last: sorted leaf `k` sits at node `2n - 2 - k`. Node `i` is
//! keccak256 of its children `2i + 1` and `2i + 2` in ascending byte order,
//! and node 0 is the root. This is the layout of the OpenZeppelin
//! `SimpleMerkleTree` the counterparty uses to check proofs.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::domain::Hash;

/// Root reported for a tree without leaves.
pub const EMPTY_ROOT: Hash = [0u8; 32];

/// Merkle leaf for the secret hash at `index`.
pub fn merkle_leaf(index: usize, secret_hash: &Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update((index as u64).to_be_bytes());
    hasher.update(secret_hash);
    hasher.finalize().into()
}

/// Merkle tree stored as a flat node array, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMerkleTree {
    /// Children of node `i` are `2i + 1` and `2i + 2`.
    nodes: Vec<Hash>,
    /// Leaves in the order they were supplied.
    leaves: Vec<Hash>,
    /// Node position of each supplied leaf.
    positions: Vec<usize>,
}

impl SecretMerkleTree {
    /// Build a tree from ordered leaves.
    ///
    /// Same leaves in the same order always give the same root.
    pub fn build(leaves: Vec<Hash>) -> Self {
        if leaves.is_empty() {
            return Self {
                nodes: Vec::new(),
                leaves,
                positions: Vec::new(),
            };
        }

        let count = leaves.len();
        let mut sorted: Vec<usize> = (0..count).collect();
        sorted.sort_by(|a, b| leaves[*a].cmp(&leaves[*b]));

        let mut nodes = vec![EMPTY_ROOT; 2 * count - 1];
        let mut positions = vec![0usize; count];
        for (rank, &index) in sorted.iter().enumerate() {
            let position = nodes.len() - 1 - rank;
            nodes[position] = leaves[index];
            positions[index] = position;
        }
        for i in (0..count - 1).rev() {
            nodes[i] = hash_pair(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }

        Self {
            nodes,
            leaves,
            positions,
        }
    }

    /// Root hash ([`EMPTY_ROOT`] when there are no leaves).
    pub fn root(&self) -> Hash {
        self.nodes.first().copied().unwrap_or(EMPTY_ROOT)
    }

    /// Leaves in the order they were supplied.
    pub fn leaves(&self) -> &[Hash] {
        &self.leaves
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Sibling path from supplied leaf `index` to the root.
    pub fn proof(&self, index: usize) -> Option<Vec<Hash>> {
        let mut position = *self.positions.get(index)?;
        let mut path = Vec::new();
        while position > 0 {
            let sibling = if position % 2 == 1 {
                position + 1
            } else {
                position - 1
            };
            path.push(*self.nodes.get(sibling)?);
            position = (position - 1) / 2;
        }
        Some(path)
    }

    /// Recompute the root from a leaf and its path and compare.
    pub fn verify(leaf: &Hash, proof: &[Hash], root: &Hash) -> bool {
        let computed = proof
            .iter()
            .fold(*leaf, |current, sibling| hash_pair(&current, sibling));
        computed == *root
    }
}

/// Commutative pair hash: keccak256(min(a, b) || max(a, b)).
fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Keccak256::new();
    hasher.update(first);
    hasher.update(second);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: u8) -> Vec<Hash> {
        (0..n).map(|i| merkle_leaf(i as usize, &[i; 32])).collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = SecretMerkleTree::build(vec![]);
        assert_eq!(tree.root(), EMPTY_ROOT);
        assert_eq!(tree.leaf_count(), 0);
        assert!(tree.proof(0).is_none());
    }

    #[test]
    fn test_single_leaf_is_root() {
        let l = leaves(1);
        let tree = SecretMerkleTree::build(l.clone());
        assert_eq!(tree.root(), l[0]);
        assert_eq!(tree.proof(0), Some(vec![]));
    }

    #[test]
    fn test_two_leaves() {
        let l = leaves(2);
        let tree = SecretMerkleTree::build(l.clone());
        assert_eq!(tree.root(), hash_pair(&l[0], &l[1]));
    }

    #[test]
    fn test_pair_hash_commutative() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    /// Leaves already in ascending order, so sorting leaves them in place.
    fn ascending(n: u8) -> Vec<Hash> {
        (1..=n).map(|i| [i; 32]).collect()
    }

    #[test]
    fn test_three_leaves_layout() {
        let l = ascending(3);
        let tree = SecretMerkleTree::build(l.clone());
        let expected = hash_pair(&hash_pair(&l[0], &l[1]), &l[2]);
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn test_five_leaves_layout() {
        let l = ascending(5);
        let tree = SecretMerkleTree::build(l.clone());
        // Nodes 4..=8 hold l4..l0, so l4 pairs with hash(l0, l1).
        let expected = hash_pair(
            &hash_pair(&hash_pair(&l[0], &l[1]), &l[4]),
            &hash_pair(&l[2], &l[3]),
        );
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn test_seven_leaves_layout() {
        let l = ascending(7);
        let tree = SecretMerkleTree::build(l.clone());
        let expected = hash_pair(
            &hash_pair(&hash_pair(&l[4], &l[5]), &hash_pair(&l[2], &l[3])),
            &hash_pair(&hash_pair(&l[0], &l[1]), &l[6]),
        );
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn test_root_ignores_supply_order() {
        let l = ascending(6);
        let mut shuffled = l.clone();
        shuffled.swap(0, 5);
        shuffled.swap(1, 3);

        let tree = SecretMerkleTree::build(shuffled.clone());
        assert_eq!(tree.root(), SecretMerkleTree::build(l).root());
        assert_eq!(tree.leaves(), shuffled.as_slice());

        // Proofs follow the supplied index, not the sorted position.
        let proof = tree.proof(0).unwrap();
        assert!(SecretMerkleTree::verify(&shuffled[0], &proof, &tree.root()));
    }

    #[test]
    fn test_deterministic() {
        let a = SecretMerkleTree::build(leaves(5));
        let b = SecretMerkleTree::build(leaves(5));
        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn test_leaf_depends_on_index() {
        let hash = [9u8; 32];
        assert_ne!(merkle_leaf(0, &hash), merkle_leaf(1, &hash));
    }

    #[test]
    fn test_every_proof_verifies() {
        for n in 1..=9u8 {
            let l = leaves(n);
            let tree = SecretMerkleTree::build(l.clone());
            for (i, leaf) in l.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert!(
                    SecretMerkleTree::verify(leaf, &proof, &tree.root()),
                    "proof for leaf {} of {} failed",
                    i,
                    n
                );
            }
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let l = leaves(4);
        let tree = SecretMerkleTree::build(l.clone());
        let mut proof = tree.proof(2).unwrap();
        proof[0][0] ^= 0xFF;
        assert!(!SecretMerkleTree::verify(&l[2], &proof, &tree.root()));
    }

    #[test]
    fn test_wrong_leaf_fails() {
        let l = leaves(4);
        let tree = SecretMerkleTree::build(l.clone());
        let proof = tree.proof(1).unwrap();
        assert!(!SecretMerkleTree::verify(&l[0], &proof, &tree.root()));
    }
}
