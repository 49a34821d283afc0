//! The ledger: chain, pending set, finalized map, identities and index.
//!
//! All state sits behind one mutex. `create_request` and `finalize` run their
//! whole check-then-mutate sequence under that lock, so a request moves from
//! pending to finalized at most once no matter how many callers race on it.
//! Every fallible check runs before the first mutation; a failed operation
//! leaves the ledger exactly as it was.

use pledge_types::{BlockHash, Signature, WalletAddress};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

use crate::block::{Block, BlockPayload, Direction, FinalizationPayload, RequestPayload};
use crate::capabilities::{
    Clock, Ed25519Verifier, IdentityVerifier, OsRandom, RandomSource, SystemClock,
};
use crate::error::LedgerError;
use crate::identity::{Credentials, Identity, IdentityRegistry};
use crate::index::{TransactionEntry, TransactionIndex, TransactionStatus};

/// Summary statistics for the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub blocks: u64,
    pub pending: u64,
    pub finalized: u64,
    pub identities: u64,
}

struct LedgerState {
    chain: Vec<Block>,
    by_hash: HashMap<BlockHash, usize>,
    pending: HashSet<BlockHash>,
    finalized: HashMap<BlockHash, BlockHash>,
    identities: IdentityRegistry,
    index: TransactionIndex,
    random: Box<dyn RandomSource>,
}

impl LedgerState {
    fn block(&self, hash: &BlockHash) -> Option<&Block> {
        self.by_hash.get(hash).map(|&height| &self.chain[height])
    }

    /// Link a new block onto the chain tip. The only way blocks are added.
    fn append(&mut self, payload: BlockPayload, clock: &dyn Clock) -> Block {
        let previous = self.chain.last().map_or(BlockHash::ZERO, Block::hash);
        let block = Block::new(payload, previous, clock.now());
        self.by_hash.insert(block.hash(), self.chain.len());
        self.chain.push(block.clone());
        block
    }
}

pub struct Ledger {
    state: Mutex<LedgerState>,
    verifier: Box<dyn IdentityVerifier>,
    clock: Box<dyn Clock>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A ledger with Ed25519 identities, the system clock and OS randomness.
    pub fn new() -> Self {
        Self::with_capabilities(
            Box::new(Ed25519Verifier),
            Box::new(SystemClock),
            Box::new(OsRandom::new()),
        )
    }

    /// A ledger with injected capabilities. The genesis block is appended here.
    pub fn with_capabilities(
        verifier: Box<dyn IdentityVerifier>,
        clock: Box<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let mut state = LedgerState {
            chain: Vec::new(),
            by_hash: HashMap::new(),
            pending: HashSet::new(),
            finalized: HashMap::new(),
            identities: IdentityRegistry::new(),
            index: TransactionIndex::new(),
            random,
        };
        let genesis = state.append(BlockPayload::Genesis, clock.as_ref());
        info!(genesis = %genesis.hash(), "ledger created");
        Self {
            state: Mutex::new(state),
            verifier,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a transfer request from `source` to `target`, pending until
    /// the target accepts or the source revokes it.
    ///
    /// `signature` must cover [`RequestPayload::signing_message`]. A source
    /// without a stored identity must present `credentials`. Both addresses
    /// must carry a valid checksum, else [`LedgerError::InvalidAddress`].
    pub fn create_request(
        &self,
        source: &WalletAddress,
        target: &WalletAddress,
        amount: u64,
        direction: Direction,
        signature: &Signature,
        credentials: Option<&Credentials>,
    ) -> Result<Block, LedgerError> {
        for address in [source, target] {
            if !self.verifier.is_valid_address(address) {
                warn!(%address, "request rejected: invalid address");
                return Err(LedgerError::InvalidAddress(address.clone()));
            }
        }

        let request = RequestPayload {
            source: source.clone(),
            target: target.clone(),
            amount,
            direction,
        };
        let message = request.signing_message();

        let mut guard = self.lock();
        let state = &mut *guard;

        let authorization = state
            .identities
            .authorize(
                self.verifier.as_ref(),
                state.random.as_mut(),
                source,
                credentials,
                &message,
                signature,
            )
            .inspect_err(|e| warn!(%source, error = %e, "request rejected"))?;
        let bootstrapped = authorization.is_bootstrap();
        let source_username = state.identities.commit(authorization)?.username.clone();
        if bootstrapped {
            state.index.fill_target_username(source, &source_username);
        }
        let target_username = state.identities.username(target).map(str::to_string);

        let block = state.append(BlockPayload::Request(request.clone()), self.clock.as_ref());
        state.pending.insert(block.hash());
        state
            .index
            .record_request(&block, &request, source_username, target_username);

        info!(hash = %block.hash(), %source, %target, amount, "request created");
        Ok(block)
    }

    /// Accept or revoke a pending request.
    ///
    /// Acceptance is authorized by the request's target, who may bootstrap an
    /// identity with `credentials`. Revocation is authorized by the source only.
    /// `signature` must cover [`FinalizationPayload::signing_message`].
    pub fn finalize(
        &self,
        request_hash: &BlockHash,
        accepted: bool,
        signature: &Signature,
        credentials: Option<&Credentials>,
    ) -> Result<Block, LedgerError> {
        let mut guard = self.lock();
        let state = &mut *guard;

        let request = state
            .block(request_hash)
            .ok_or(LedgerError::UnknownBlock(*request_hash))?
            .payload()
            .as_request()
            .cloned()
            .ok_or(LedgerError::NotARequest(*request_hash))?;

        if !state.pending.contains(request_hash) {
            return Err(match state.finalized.get(request_hash) {
                Some(&finalization) => LedgerError::AlreadyFinalized {
                    request: *request_hash,
                    finalization,
                },
                None => LedgerError::NotARequest(*request_hash),
            });
        }

        let authority = if accepted {
            &request.target
        } else {
            &request.source
        };
        let message = FinalizationPayload::signing_message(request_hash, accepted);
        let authorization = state
            .identities
            .authorize(
                self.verifier.as_ref(),
                state.random.as_mut(),
                authority,
                credentials,
                &message,
                signature,
            )
            .inspect_err(|e| {
                warn!(request = %request_hash, %authority, error = %e, "finalization rejected")
            })?;
        let bootstrapped = authorization
            .is_bootstrap()
            .then(|| authorization.address().clone());
        let username = state.identities.commit(authorization)?.username.clone();
        if let Some(address) = bootstrapped {
            state.index.fill_target_username(&address, &username);
        }

        let payload = FinalizationPayload {
            request: *request_hash,
            accepted,
        };
        let block = state.append(BlockPayload::Finalization(payload), self.clock.as_ref());
        state.pending.remove(request_hash);
        state.finalized.insert(*request_hash, block.hash());

        let target_username = state.identities.username(&request.target);
        state.index.finalize(
            &request,
            request_hash,
            TransactionStatus::from_decision(accepted),
            target_username,
        );

        info!(
            request = %request_hash,
            finalization = %block.hash(),
            accepted,
            "request finalized"
        );
        Ok(block)
    }

    /// Accept a pending request as its target.
    pub fn accept(
        &self,
        request_hash: &BlockHash,
        signature: &Signature,
        credentials: Option<&Credentials>,
    ) -> Result<Block, LedgerError> {
        self.finalize(request_hash, true, signature, credentials)
    }

    /// Revoke a pending request as its source.
    pub fn revoke(
        &self,
        request_hash: &BlockHash,
        signature: &Signature,
    ) -> Result<Block, LedgerError> {
        self.finalize(request_hash, false, signature, None)
    }

    pub fn retrieve(&self, hash: &BlockHash) -> Result<Block, LedgerError> {
        self.lock()
            .block(hash)
            .cloned()
            .ok_or(LedgerError::UnknownBlock(*hash))
    }

    /// Every request involving `address`; empty if there are none.
    pub fn transactions_for(
        &self,
        address: &WalletAddress,
    ) -> BTreeMap<BlockHash, TransactionEntry> {
        self.lock().index.for_address(address)
    }

    pub fn is_pending(&self, request_hash: &BlockHash) -> bool {
        self.lock().pending.contains(request_hash)
    }

    /// Hash of the block that finalized `request_hash`, if any.
    pub fn finalization_of(&self, request_hash: &BlockHash) -> Option<BlockHash> {
        self.lock().finalized.get(request_hash).copied()
    }

    pub fn identity(&self, address: &WalletAddress) -> Option<Identity> {
        self.lock().identities.get(address).cloned()
    }

    /// Copy of the whole chain, genesis first.
    pub fn chain(&self) -> Vec<Block> {
        self.lock().chain.clone()
    }

    pub fn genesis_hash(&self) -> BlockHash {
        self.lock().chain[0].hash()
    }

    pub fn summary(&self) -> LedgerSummary {
        let state = self.lock();
        LedgerSummary {
            blocks: state.chain.len() as u64,
            pending: state.pending.len() as u64,
            finalized: state.finalized.len() as u64,
            identities: state.identities.len() as u64,
        }
    }

    /// Recompute every hash and check every link back to genesis.
    pub fn validate_chain(&self) -> Result<(), LedgerError> {
        let state = self.lock();
        let mut expected_previous = BlockHash::ZERO;
        for (height, block) in state.chain.iter().enumerate() {
            let corrupted = |reason: &str| LedgerError::ChainCorrupted {
                height,
                reason: reason.to_string(),
            };
            if block.is_genesis() != (height == 0) {
                return Err(corrupted("genesis payload must appear exactly at height 0"));
            }
            if block.previous() != expected_previous {
                return Err(corrupted("previous hash does not match preceding block"));
            }
            if block.compute_hash() != block.hash() {
                return Err(corrupted("stored hash does not match block content"));
            }
            expected_previous = block.hash();
        }
        Ok(())
    }
}
