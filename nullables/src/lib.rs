//! Nullable infrastructure for deterministic testing.
//!
//! The ledger reaches the outside world (time, randomness, signature checks)
//! only through the traits in `pledge_ledger::capabilities`. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the OS clock or entropy source
//!
//! Usage: build the ledger with `Ledger::with_capabilities` and pass nullables.

pub mod clock;
pub mod random;
pub mod verifier;

pub use clock::NullClock;
pub use random::NullRandom;
pub use verifier::NullVerifier;

use pledge_ledger::Ledger;
use std::sync::Arc;

/// A ledger wired entirely to nullables, with handles to steer them.
pub struct NullLedger {
    pub ledger: Ledger,
    pub clock: Arc<NullClock>,
    pub verifier: Arc<NullVerifier>,
}

impl NullLedger {
    /// Ledger at `initial_secs` whose username suffixes follow `suffixes`.
    pub fn new(initial_secs: u64, suffixes: Vec<u16>) -> Self {
        let clock = Arc::new(NullClock::new(initial_secs));
        let verifier = Arc::new(NullVerifier::accepting());
        let ledger = Ledger::with_capabilities(
            Box::new(Arc::clone(&verifier)),
            Box::new(Arc::clone(&clock)),
            Box::new(NullRandom::new(suffixes)),
        );
        Self {
            ledger,
            clock,
            verifier,
        }
    }
}
