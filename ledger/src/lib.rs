//! Hash-linked ledger of transfer requests with two-phase finalization.
//!
//! A request block is created pending. Its target later accepts it, or its
//! source revokes it; either decision appends a finalization block that
//! references the request. Each address bootstraps its identity (public key
//! and username) on its first action and is verified by signature afterwards.
//! A per-address index keeps every party's history queryable.

pub mod block;
pub mod capabilities;
pub mod error;
pub mod identity;
pub mod index;
pub mod ledger;

pub use block::{Block, BlockPayload, Direction, FinalizationPayload, RequestPayload};
pub use capabilities::{
    Clock, Ed25519Verifier, IdentityVerifier, OsRandom, RandomSource, SystemClock,
};
pub use error::LedgerError;
pub use identity::{
    Authorization, Credentials, Identity, IdentityRegistry, USERNAME_SUFFIX_SPACE,
};
pub use index::{TransactionEntry, TransactionIndex, TransactionStatus};
pub use ledger::{Ledger, LedgerSummary};
