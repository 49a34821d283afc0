//! Per-address transaction index.
//!
//! Every request is indexed twice, under its source and its target, so that
//! either party can list its history without scanning the chain. Both
//! entries change together when the request is finalized.

use pledge_types::{BlockHash, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::block::{Block, RequestPayload};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl TransactionStatus {
    pub fn from_decision(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }

    pub fn is_final(self) -> bool {
        self != Self::Pending
    }
}

/// One party's view of a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionEntry {
    /// The request block itself.
    pub block: Block,
    pub status: TransactionStatus,
    pub source_username: String,
    /// `None` while the target has never registered an identity.
    pub target_username: Option<String>,
}

#[derive(Debug, Default)]
pub struct TransactionIndex {
    by_address: HashMap<WalletAddress, BTreeMap<BlockHash, TransactionEntry>>,
}

impl TransactionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a newly created request as pending for both parties.
    pub fn record_request(
        &mut self,
        block: &Block,
        request: &RequestPayload,
        source_username: String,
        target_username: Option<String>,
    ) {
        let entry = TransactionEntry {
            block: block.clone(),
            status: TransactionStatus::Pending,
            source_username,
            target_username,
        };
        for address in [&request.source, &request.target] {
            self.by_address
                .entry(address.clone())
                .or_default()
                .insert(block.hash(), entry.clone());
        }
    }

    /// Set the final status on both parties' entries.
    ///
    /// `target_username` fills in the target's name when it became known
    /// after the request was created.
    pub fn finalize(
        &mut self,
        request: &RequestPayload,
        request_hash: &BlockHash,
        status: TransactionStatus,
        target_username: Option<&str>,
    ) {
        for address in [&request.source, &request.target] {
            let entry = self
                .by_address
                .get_mut(address)
                .and_then(|entries| entries.get_mut(request_hash));
            if let Some(entry) = entry {
                entry.status = status;
                if entry.target_username.is_none() {
                    entry.target_username = target_username.map(str::to_string);
                }
            }
        }
    }

    /// Record a newly registered `username` on every request `target` is the
    /// target of, in both parties' entries.
    pub fn fill_target_username(&mut self, target: &WalletAddress, username: &str) {
        let Some(entries) = self.by_address.get(target) else {
            return;
        };
        let unnamed: Vec<(BlockHash, WalletAddress)> = entries
            .iter()
            .filter(|(_, entry)| entry.target_username.is_none())
            .filter_map(|(hash, entry)| {
                entry
                    .block
                    .payload()
                    .as_request()
                    .filter(|request| request.target == *target)
                    .map(|request| (*hash, request.source.clone()))
            })
            .collect();
        for (hash, source) in unnamed {
            for address in [&source, target] {
                let entry = self
                    .by_address
                    .get_mut(address)
                    .and_then(|entries| entries.get_mut(&hash));
                if let Some(entry) = entry {
                    entry
                        .target_username
                        .get_or_insert_with(|| username.to_string());
                }
            }
        }
    }

    /// Snapshot of every request involving `address`, keyed by request hash.
    pub fn for_address(&self, address: &WalletAddress) -> BTreeMap<BlockHash, TransactionEntry> {
        self.by_address.get(address).cloned().unwrap_or_default()
    }

    pub fn entry(
        &self,
        address: &WalletAddress,
        request_hash: &BlockHash,
    ) -> Option<&TransactionEntry> {
        self.by_address.get(address)?.get(request_hash)
    }

    /// Number of addresses with at least one indexed request.
    pub fn address_count(&self) -> usize {
        self.by_address.len()
    }
}
