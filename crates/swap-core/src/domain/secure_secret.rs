//! # Swap Secret
//!
//! A 32-byte hashlock preimage that zeroizes its memory on drop.
//!
//! Secrets are released to counterparties one fill at a time, so they live in
//! memory for the whole swap attempt. The wrapper keeps them out of `Debug`
//! output and clears them once the attempt is over.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a swap secret in bytes.
pub const SECRET_LEN: usize = 32;

/// A hashlock preimage.
///
/// Intentionally neither `Clone` nor `PartialEq`: only the
/// [`SecretVault`](crate::algorithms::SecretVault) creates secrets and no code
/// path needs to compare two of them.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    inner: [u8; SECRET_LEN],
}

impl Secret {
    /// Wrap raw bytes.
    pub fn new(bytes: [u8; SECRET_LEN]) -> Self {
        Self { inner: bytes }
    }

    /// Create from a slice (copies into fixed array).
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != SECRET_LEN {
            return None;
        }
        let mut inner = [0u8; SECRET_LEN];
        inner.copy_from_slice(slice);
        Some(Self { inner })
    }

    /// Borrow the secret bytes.
    ///
    /// Do not keep the returned reference beyond the call that needs it.
    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.inner
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}
