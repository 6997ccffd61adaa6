//! # Algorithms Module
//!
//! Secret generation, Merkle commitment and hashlock derivation.

pub mod hash_lock;
pub mod merkle;
pub mod secret;

pub use hash_lock::HashlockBuilder;
pub use merkle::{merkle_leaf, SecretMerkleTree, EMPTY_ROOT};
pub use secret::{hash_secret, verify_secret, SecretVault, MAX_SECRETS};
