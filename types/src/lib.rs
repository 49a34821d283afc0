//! Fundamental types for the pledge ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, block hashes, keys, signatures and timestamps.

pub mod address;
pub mod block;
pub mod error;
pub mod keys;
pub mod serde_hex;
pub mod time;

pub use address::WalletAddress;
pub use block::BlockHash;
pub use error::ParseError;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use time::Timestamp;
