//! External capabilities the ledger consumes: identity checks, time, randomness.
//!
//! Production implementations live here; deterministic ones for tests live
//! in `pledge-nullables`.

use pledge_types::{PublicKey, Signature, Timestamp, WalletAddress};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Address derivation and signature verification.
pub trait IdentityVerifier: Send + Sync {
    /// The canonical address owned by `public_key`.
    fn derive_address(&self, public_key: &PublicKey) -> WalletAddress;

    /// Whether `address` is well-formed and could be derived from some key.
    fn is_valid_address(&self, address: &WalletAddress) -> bool;

    /// Whether `signature` over `message` validates under `public_key`.
    fn verify_signature(&self, message: &[u8], signature: &Signature, public_key: &PublicKey)
        -> bool;
}

/// Ed25519 signatures and `plg_` addresses via `pledge-crypto`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl IdentityVerifier for Ed25519Verifier {
    fn derive_address(&self, public_key: &PublicKey) -> WalletAddress {
        pledge_crypto::derive_address(public_key)
    }

    fn is_valid_address(&self, address: &WalletAddress) -> bool {
        pledge_crypto::validate_address(address.as_str())
    }

    fn verify_signature(
        &self,
        message: &[u8],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool {
        pledge_crypto::verify_signature(message, signature, public_key)
    }
}

impl<T: IdentityVerifier + ?Sized> IdentityVerifier for Arc<T> {
    fn derive_address(&self, public_key: &PublicKey) -> WalletAddress {
        (**self).derive_address(public_key)
    }

    fn is_valid_address(&self, address: &WalletAddress) -> bool {
        (**self).is_valid_address(address)
    }

    fn verify_signature(
        &self,
        message: &[u8],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool {
        (**self).verify_signature(message, signature, public_key)
    }
}

/// Source of block timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Uniform random numbers, used for username suffixes.
pub trait RandomSource: Send {
    /// A value in `0..bound`. `bound` is never zero.
    fn below(&mut self, bound: u16) -> u16;
}

/// `StdRng` seeded from the operating system.
pub struct OsRandom {
    rng: StdRng,
}

impl OsRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for OsRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for OsRandom {
    fn below(&mut self, bound: u16) -> u16 {
        self.rng.gen_range(0..bound)
    }
}
