//! RPC error types and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pledge_ledger::LedgerError;
use pledge_types::WalletAddress;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("invalid block hash: {0}")]
    InvalidHash(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no identity registered for {0}")]
    IdentityNotFound(WalletAddress),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    finalization: Option<String>,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Ledger(e) => match e {
                LedgerError::UnknownBlock(_) => StatusCode::NOT_FOUND,
                LedgerError::AlreadyFinalized { .. }
                | LedgerError::AlreadyRegistered(_)
                | LedgerError::UsernameTaken(_) => StatusCode::CONFLICT,
                LedgerError::IdentityBootstrapRequired(_) => StatusCode::PRECONDITION_REQUIRED,
                LedgerError::InvalidIdentity(_) => StatusCode::FORBIDDEN,
                LedgerError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
                LedgerError::SignatureInvalid(_) => StatusCode::UNAUTHORIZED,
                LedgerError::NotARequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::ChainCorrupted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidHash(_) | Self::InvalidAddress(_) | Self::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::IdentityNotFound(_) => StatusCode::NOT_FOUND,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable name for the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ledger(e) => match e {
                LedgerError::UnknownBlock(_) => "unknown_block",
                LedgerError::AlreadyFinalized { .. } => "already_finalized",
                LedgerError::IdentityBootstrapRequired(_) => "identity_bootstrap_required",
                LedgerError::InvalidIdentity(_) => "invalid_identity",
                LedgerError::InvalidAddress(_) => "invalid_address",
                LedgerError::SignatureInvalid(_) => "signature_invalid",
                LedgerError::AlreadyRegistered(_) => "already_registered",
                LedgerError::UsernameTaken(_) => "username_taken",
                LedgerError::NotARequest(_) => "not_a_request",
                LedgerError::ChainCorrupted { .. } => "chain_corrupted",
            },
            Self::InvalidHash(_) => "invalid_hash",
            Self::InvalidAddress(_) => "invalid_address",
            Self::InvalidRequest(_) => "invalid_request",
            Self::IdentityNotFound(_) => "identity_not_found",
            Self::Server(_) => "server_error",
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let finalization = match &self {
            Self::Ledger(LedgerError::AlreadyFinalized { finalization, .. }) => {
                Some(finalization.to_string())
            }
            _ => None,
        };
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            finalization,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pledge_types::BlockHash;

    #[test]
    fn ledger_errors_map_to_distinct_statuses() {
        let address = WalletAddress::new(format!("plg_{}", "a".repeat(60)));
        let hash = BlockHash::new([1; 32]);
        let cases = [
            (LedgerError::UnknownBlock(hash), StatusCode::NOT_FOUND),
            (
                LedgerError::AlreadyFinalized {
                    request: hash,
                    finalization: hash,
                },
                StatusCode::CONFLICT,
            ),
            (
                LedgerError::IdentityBootstrapRequired(address.clone()),
                StatusCode::PRECONDITION_REQUIRED,
            ),
            (LedgerError::InvalidIdentity(address.clone()), StatusCode::FORBIDDEN),
            (LedgerError::InvalidAddress(address.clone()), StatusCode::BAD_REQUEST),
            (LedgerError::SignatureInvalid(address), StatusCode::UNAUTHORIZED),
            (LedgerError::NotARequest(hash), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (error, status) in cases {
            assert_eq!(RpcError::from(error).status(), status);
        }
    }

    #[test]
    fn parse_errors_are_bad_requests() {
        assert_eq!(
            RpcError::InvalidHash("zz".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RpcError::InvalidAddress("x".into()).kind(), "invalid_address");
    }
}
