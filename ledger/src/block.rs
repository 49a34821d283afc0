//! Blocks: immutable, hash-identified records linked to their predecessor.
//!
//! A block's payload is one of three kinds. The hash covers a canonical
//! byte encoding of the payload and timestamp, followed by the previous
//! block's hash:
//!
//! ```text
//! hash = Blake2b-256(canonical(payload, timestamp) || previous)
//! ```
//!
//! The canonical encoding writes a one-byte payload tag, then every field in
//! declaration order. Strings are prefixed with their u32 big-endian length,
//! integers are big-endian, booleans are one byte. The timestamp goes last as
//! its length-prefixed decimal string.

use pledge_types::{BlockHash, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

const REQUEST_DOMAIN: &[u8] = b"pledge/request/v1";
const FINALIZATION_DOMAIN: &[u8] = b"pledge/finalization/v1";

/// Who owes whom once a request is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    SourceToTarget,
    TargetToSource,
}

impl Direction {
    fn code(self) -> u8 {
        match self {
            Self::SourceToTarget => 0,
            Self::TargetToSource => 1,
        }
    }
}

/// A proposed transfer awaiting the counterparty's decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub source: WalletAddress,
    pub target: WalletAddress,
    pub amount: u64,
    pub direction: Direction,
}

impl RequestPayload {
    /// Bytes the source signs to create this request.
    pub fn signing_message(&self) -> Vec<u8> {
        let mut out = Canonical::with_domain(REQUEST_DOMAIN);
        self.write(&mut out);
        out.into_bytes()
    }

    fn write(&self, out: &mut Canonical) {
        out.put_str(self.source.as_str());
        out.put_str(self.target.as_str());
        out.put_u64(self.amount);
        out.put_u8(self.direction.code());
    }
}

/// The decision recorded for an earlier request block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationPayload {
    /// Hash of the request block being decided. Lookup only.
    pub request: BlockHash,
    pub accepted: bool,
}

impl FinalizationPayload {
    /// Bytes the authorizing party signs to accept or revoke `request`.
    ///
    /// The decision is part of the message, so a signature for acceptance
    /// cannot be replayed as a revocation.
    pub fn signing_message(request: &BlockHash, accepted: bool) -> Vec<u8> {
        let mut out = Canonical::with_domain(FINALIZATION_DOMAIN);
        out.put_bytes(request.as_bytes());
        out.put_u8(u8::from(accepted));
        out.into_bytes()
    }

    fn write(&self, out: &mut Canonical) {
        out.put_bytes(self.request.as_bytes());
        out.put_u8(u8::from(self.accepted));
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockPayload {
    Genesis,
    Request(RequestPayload),
    Finalization(FinalizationPayload),
}

impl BlockPayload {
    fn tag(&self) -> u8 {
        match self {
            Self::Genesis => 0,
            Self::Request(_) => 1,
            Self::Finalization(_) => 2,
        }
    }

    pub fn as_request(&self) -> Option<&RequestPayload> {
        match self {
            Self::Request(request) => Some(request),
            _ => None,
        }
    }

    pub fn as_finalization(&self) -> Option<&FinalizationPayload> {
        match self {
            Self::Finalization(finalization) => Some(finalization),
            _ => None,
        }
    }

    /// Deterministic encoding of this payload stamped with `timestamp`.
    pub fn canonical_bytes(&self, timestamp: Timestamp) -> Vec<u8> {
        let mut out = Canonical::default();
        out.put_u8(self.tag());
        match self {
            Self::Genesis => {}
            Self::Request(request) => request.write(&mut out),
            Self::Finalization(finalization) => finalization.write(&mut out),
        }
        out.put_str(&timestamp.to_string());
        out.into_bytes()
    }
}

/// An immutable block of the chain.
///
/// Fields are private: the hash is fixed at construction and no accessor
/// hands out a mutable reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Block {
    payload: BlockPayload,
    previous: BlockHash,
    timestamp: Timestamp,
    hash: BlockHash,
}

impl Block {
    pub fn new(payload: BlockPayload, previous: BlockHash, timestamp: Timestamp) -> Self {
        let hash = pledge_crypto::hash_block(&payload.canonical_bytes(timestamp), &previous);
        Self {
            payload,
            previous,
            timestamp,
            hash,
        }
    }

    /// The root block: empty payload, zero predecessor.
    pub fn genesis(timestamp: Timestamp) -> Self {
        Self::new(BlockPayload::Genesis, BlockHash::ZERO, timestamp)
    }

    pub fn payload(&self) -> &BlockPayload {
        &self.payload
    }

    pub fn previous(&self) -> BlockHash {
        self.previous
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    /// Recompute the hash from the stored fields.
    pub fn compute_hash(&self) -> BlockHash {
        pledge_crypto::hash_block(&self.payload.canonical_bytes(self.timestamp), &self.previous)
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self.payload, BlockPayload::Genesis)
    }
}

#[derive(Default)]
struct Canonical(Vec<u8>);

impl Canonical {
    fn with_domain(domain: &[u8]) -> Self {
        let mut out = Self::default();
        out.put_bytes(domain);
        out
    }

    fn put_u8(&mut self, value: u8) {
        self.0.push(value);
    }

    fn put_u64(&mut self, value: u64) {
        self.0.extend_from_slice(&value.to_be_bytes());
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        self.0.extend_from_slice(bytes);
    }

    fn put_str(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: u64) -> BlockPayload {
        BlockPayload::Request(RequestPayload {
            source: WalletAddress::new("plg_alice"),
            target: WalletAddress::new("plg_bob"),
            amount,
            direction: Direction::SourceToTarget,
        })
    }

    #[test]
    fn genesis_has_zero_previous() {
        let genesis = Block::genesis(Timestamp::new(1_700_000_000));
        assert!(genesis.is_genesis());
        assert!(genesis.previous().is_zero());
        assert!(!genesis.hash().is_zero());
    }

    #[test]
    fn hash_is_deterministic() {
        let previous = BlockHash::new([9; 32]);
        let a = Block::new(request(100), previous, Timestamp::new(5));
        let b = Block::new(request(100), previous, Timestamp::new(5));
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.compute_hash(), a.hash());
    }

    #[test]
    fn every_field_feeds_the_hash() {
        let previous = BlockHash::new([9; 32]);
        let ts = Timestamp::new(5);
        let base = Block::new(request(100), previous, ts).hash();

        assert_ne!(base, Block::new(request(101), previous, ts).hash());
        assert_ne!(base, Block::new(request(100), BlockHash::new([8; 32]), ts).hash());
        assert_ne!(base, Block::new(request(100), previous, Timestamp::new(6)).hash());

        let flipped = BlockPayload::Request(RequestPayload {
            source: WalletAddress::new("plg_alice"),
            target: WalletAddress::new("plg_bob"),
            amount: 100,
            direction: Direction::TargetToSource,
        });
        assert_ne!(base, Block::new(flipped, previous, ts).hash());

        let swapped = BlockPayload::Request(RequestPayload {
            source: WalletAddress::new("plg_bob"),
            target: WalletAddress::new("plg_alice"),
            amount: 100,
            direction: Direction::SourceToTarget,
        });
        assert_ne!(base, Block::new(swapped, previous, ts).hash());
    }

    #[test]
    fn length_prefix_separates_adjacent_strings() {
        let a = RequestPayload {
            source: WalletAddress::new("plg_ab"),
            target: WalletAddress::new("plg_c"),
            amount: 1,
            direction: Direction::SourceToTarget,
        };
        let b = RequestPayload {
            source: WalletAddress::new("plg_a"),
            target: WalletAddress::new("plg_bc"),
            ..a.clone()
        };
        assert_ne!(a.signing_message(), b.signing_message());
    }

    #[test]
    fn finalization_message_binds_decision() {
        let hash = BlockHash::new([3; 32]);
        assert_ne!(
            FinalizationPayload::signing_message(&hash, true),
            FinalizationPayload::signing_message(&hash, false)
        );
    }

    #[test]
    fn request_and_finalization_domains_differ() {
        let payload = RequestPayload {
            source: WalletAddress::new("plg_a"),
            target: WalletAddress::new("plg_b"),
            amount: 0,
            direction: Direction::SourceToTarget,
        };
        let finalize = FinalizationPayload::signing_message(&BlockHash::ZERO, false);
        assert_ne!(payload.signing_message()[..8], finalize[..8]);
    }

    #[test]
    fn json_is_tagged_by_kind() {
        let block = Block::new(request(7), BlockHash::ZERO, Timestamp::new(1));
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["payload"]["kind"], "request");
        assert_eq!(json["payload"]["direction"], "source_to_target");
        assert_eq!(json["hash"], block.hash().to_string());
    }
}
