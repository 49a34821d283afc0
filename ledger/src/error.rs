use pledge_types::{BlockHash, WalletAddress};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown block: {0}")]
    UnknownBlock(BlockHash),

    #[error("request {request} already finalized by block {finalization}")]
    AlreadyFinalized {
        request: BlockHash,
        finalization: BlockHash,
    },

    #[error("no identity stored for {0}: public key and username are required")]
    IdentityBootstrapRequired(WalletAddress),

    #[error("malformed address or bad checksum: {0}")]
    InvalidAddress(WalletAddress),

    #[error("public key does not derive address {0}")]
    InvalidIdentity(WalletAddress),

    #[error("signature does not verify for {0}")]
    SignatureInvalid(WalletAddress),

    #[error("address {0} already has a registered identity")]
    AlreadyRegistered(WalletAddress),

    #[error("username already registered: {0}")]
    UsernameTaken(String),

    #[error("block {0} is not a request block")]
    NotARequest(BlockHash),

    #[error("chain corrupted at height {height}: {reason}")]
    ChainCorrupted { height: usize, reason: String },
}
