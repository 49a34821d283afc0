//! HTTP/JSON server for the Pledge ledger.
//!
//! Provides endpoints for:
//! - Creating transfer requests
//! - Accepting and revoking pending requests
//! - Block and identity lookups
//! - Per-address transaction history
//! - Chain summary and validation

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer};
