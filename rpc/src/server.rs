//! Axum-based HTTP server.

use axum::routing::{get, post};
use axum::Router;
use pledge_ledger::Ledger;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;

/// Build the application router over a shared ledger.
pub fn router(ledger: Arc<Ledger>) -> Router {
    Router::new()
        .route("/requests", post(handlers::create_request))
        .route("/requests/:hash/accept", post(handlers::accept_request))
        .route("/requests/:hash/revoke", post(handlers::revoke_request))
        .route("/blocks/:hash", get(handlers::get_block))
        .route(
            "/addresses/:address/transactions",
            get(handlers::get_transactions),
        )
        .route("/addresses/:address/identity", get(handlers::get_identity))
        .route("/chain/summary", get(handlers::chain_summary))
        .route("/chain/validate", get(handlers::validate_chain))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ledger)
}

pub struct RpcServer {
    pub addr: SocketAddr,
    pub ledger: Arc<Ledger>,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, ledger: Arc<Ledger>) -> Self {
        Self { addr, ledger }
    }

    /// Bind and serve until the future is dropped or the listener fails.
    pub async fn start(&self) -> Result<(), RpcError> {
        let listener = TcpListener::bind(self.addr).await?;
        info!(addr = %listener.local_addr()?, "RPC server listening");
        axum::serve(listener, router(Arc::clone(&self.ledger))).await?;
        Ok(())
    }
}
