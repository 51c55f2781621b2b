//! Secret-digest authorization
//!
//! A wallet's secret is never stored; the directory keeps a one-way SHA-256
//! digest. Verification recomputes the digest for the supplied secret and
//! compares in constant-time-equivalent fashion. The guard answers with a
//! plain `bool` — unknown wallets and mismatches both verify false, and the
//! orchestrator turns false into `Unauthorized`.

use sha2::{Digest, Sha256};
use std::sync::Arc;

use ledger_types::ids::WalletAddress;

use crate::directory::WalletDirectory;

/// SHA-256 digest of a secret, hex-encoded.
pub fn secret_digest(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Read-only authorization guard over the wallet directory.
#[derive(Debug, Clone)]
pub struct SecretGuard {
    directory: Arc<WalletDirectory>,
}

impl SecretGuard {
    pub fn new(directory: Arc<WalletDirectory>) -> Self {
        Self { directory }
    }

    /// Verify a caller-supplied secret against the stored digest.
    ///
    /// Never fails: an unknown wallet verifies false, identically to a
    /// wrong secret.
    pub fn verify(&self, wallet: &WalletAddress, supplied_secret: &str) -> bool {
        let Some(stored) = self.directory.stored_digest(wallet) else {
            return false;
        };
        let supplied = secret_digest(supplied_secret);
        constant_time_eq(supplied.as_bytes(), stored.as_bytes())
    }
}

/// Byte-wise comparison that does not short-circuit on the first mismatch.
///
/// Both inputs are hex digests of fixed length, so the length check leaks
/// nothing about the secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
