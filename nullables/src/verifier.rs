//! Nullable identity verifier: real addresses, scripted signature verdicts.

use pledge_ledger::IdentityVerifier;
use pledge_types::{PublicKey, Signature, WalletAddress};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Derives addresses exactly like production, but answers signature checks
/// with a configurable verdict so tests need no private keys.
pub struct NullVerifier {
    accept: AtomicBool,
    checks: AtomicUsize,
}

impl NullVerifier {
    /// Every signature verifies.
    pub fn accepting() -> Self {
        Self {
            accept: AtomicBool::new(true),
            checks: AtomicUsize::new(0),
        }
    }

    /// No signature verifies.
    pub fn rejecting() -> Self {
        let verifier = Self::accepting();
        verifier.set_accept(false);
        verifier
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    /// Number of signature checks performed.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl IdentityVerifier for NullVerifier {
    fn derive_address(&self, public_key: &PublicKey) -> WalletAddress {
        pledge_crypto::derive_address(public_key)
    }

    fn is_valid_address(&self, address: &WalletAddress) -> bool {
        pledge_crypto::validate_address(address.as_str())
    }

    fn verify_signature(
        &self,
        _message: &[u8],
        _signature: &Signature,
        _public_key: &PublicKey,
    ) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.accept.load(Ordering::SeqCst)
    }
}
