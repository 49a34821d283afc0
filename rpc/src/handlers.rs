//! HTTP request handlers and their JSON bodies.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use pledge_ledger::{
    Block, Credentials, Direction, Identity, Ledger, LedgerSummary, TransactionEntry,
};
use pledge_types::{BlockHash, PublicKey, Signature, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::RpcError;

pub type SharedLedger = Arc<Ledger>;

// ── Requests ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub source: WalletAddress,
    pub target: WalletAddress,
    pub amount: u64,
    pub direction: Direction,
    pub signature: Signature,
    #[serde(default)]
    pub public_key: Option<PublicKey>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptBody {
    pub signature: Signature,
    #[serde(default)]
    pub public_key: Option<PublicKey>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevokeBody {
    pub signature: Signature,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Credentials are only meaningful with a key; a missing username is left
/// blank so the ledger reports that a bootstrap is still required.
fn credentials(public_key: Option<PublicKey>, username: Option<String>) -> Option<Credentials> {
    public_key.map(|key| Credentials::new(key, username.unwrap_or_default()))
}

fn parse_hash(raw: &str) -> Result<BlockHash, RpcError> {
    raw.parse()
        .map_err(|_| RpcError::InvalidHash(raw.to_string()))
}

fn parse_address(raw: &str) -> Result<WalletAddress, RpcError> {
    raw.parse()
        .map_err(|_| RpcError::InvalidAddress(raw.to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| RpcError::InvalidRequest(rejection.body_text()))
}

/// POST /requests
pub async fn create_request(
    State(ledger): State<SharedLedger>,
    payload: Result<Json<CreateRequestBody>, JsonRejection>,
) -> Result<Json<Block>, RpcError> {
    let req = body(payload)?;
    let creds = credentials(req.public_key, req.username);
    let block = ledger.create_request(
        &req.source,
        &req.target,
        req.amount,
        req.direction,
        &req.signature,
        creds.as_ref(),
    )?;
    Ok(Json(block))
}

/// POST /requests/:hash/accept
pub async fn accept_request(
    State(ledger): State<SharedLedger>,
    Path(hash): Path<String>,
    payload: Result<Json<AcceptBody>, JsonRejection>,
) -> Result<Json<Block>, RpcError> {
    let hash = parse_hash(&hash)?;
    let req = body(payload)?;
    let creds = credentials(req.public_key, req.username);
    Ok(Json(ledger.accept(&hash, &req.signature, creds.as_ref())?))
}

/// POST /requests/:hash/revoke
pub async fn revoke_request(
    State(ledger): State<SharedLedger>,
    Path(hash): Path<String>,
    payload: Result<Json<RevokeBody>, JsonRejection>,
) -> Result<Json<Block>, RpcError> {
    let hash = parse_hash(&hash)?;
    let req = body(payload)?;
    Ok(Json(ledger.revoke(&hash, &req.signature)?))
}

// ── Queries ──────────────────────────────────────────────────────────────

/// GET /blocks/:hash
pub async fn get_block(
    State(ledger): State<SharedLedger>,
    Path(hash): Path<String>,
) -> Result<Json<Block>, RpcError> {
    let hash = parse_hash(&hash)?;
    Ok(Json(ledger.retrieve(&hash)?))
}

/// GET /addresses/:address/transactions
pub async fn get_transactions(
    State(ledger): State<SharedLedger>,
    Path(address): Path<String>,
) -> Result<Json<BTreeMap<BlockHash, TransactionEntry>>, RpcError> {
    let address = parse_address(&address)?;
    Ok(Json(ledger.transactions_for(&address)))
}

/// GET /addresses/:address/identity
pub async fn get_identity(
    State(ledger): State<SharedLedger>,
    Path(address): Path<String>,
) -> Result<Json<Identity>, RpcError> {
    let address = parse_address(&address)?;
    ledger
        .identity(&address)
        .map(Json)
        .ok_or(RpcError::IdentityNotFound(address))
}

/// GET /chain/summary
pub async fn chain_summary(State(ledger): State<SharedLedger>) -> Json<LedgerSummary> {
    Json(ledger.summary())
}

/// GET /chain/validate
pub async fn validate_chain(State(ledger): State<SharedLedger>) -> Json<ValidationResponse> {
    let response = match ledger.validate_chain() {
        Ok(()) => ValidationResponse {
            ok: true,
            error: None,
        },
        Err(e) => ValidationResponse {
            ok: false,
            error: Some(e.to_string()),
        },
    };
    Json(response)
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
