//! Shared utilities for the Pledge ledger.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
