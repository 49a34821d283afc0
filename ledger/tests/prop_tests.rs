use proptest::prelude::*;

use pledge_crypto::{derive_address, keypair_from_seed, sign_message};
use pledge_ledger::{
    Block, BlockPayload, Credentials, Direction, FinalizationPayload, Ledger, LedgerError,
    RequestPayload, TransactionStatus,
};
use pledge_types::{BlockHash, KeyPair, Timestamp, WalletAddress};

fn address(body: &str) -> WalletAddress {
    WalletAddress::new(format!("plg_{body}"))
}

fn request_payload(source: &str, target: &str, amount: u64, forward: bool) -> BlockPayload {
    BlockPayload::Request(RequestPayload {
        source: address(source),
        target: address(target),
        amount,
        direction: if forward {
            Direction::SourceToTarget
        } else {
            Direction::TargetToSource
        },
    })
}

#[derive(Clone, Debug)]
enum Op {
    Create { from: usize, to: usize, amount: u64 },
    Accept { request: usize },
    Revoke { request: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, 0usize..3, 1u64..1_000).prop_map(|(from, to, amount)| Op::Create {
            from,
            to,
            amount
        }),
        (0usize..8).prop_map(|request| Op::Accept { request }),
        (0usize..8).prop_map(|request| Op::Revoke { request }),
    ]
}

struct Party {
    keys: KeyPair,
    address: WalletAddress,
    credentials: Credentials,
}

fn parties() -> Vec<Party> {
    ["alice", "bob", "carol"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let keys = keypair_from_seed(&[i as u8 + 1; 32]);
            let address = derive_address(&keys.public);
            let credentials = Credentials::new(keys.public.clone(), *name);
            Party {
                keys,
                address,
                credentials,
            }
        })
        .collect()
}

proptest! {
    /// Identical content and predecessor always hash identically.
    #[test]
    fn block_hash_is_deterministic(
        amount in 0u64..u64::MAX,
        forward: bool,
        secs in 0u64..4_000_000_000,
        prev in prop::array::uniform32(0u8..),
    ) {
        let previous = BlockHash::new(prev);
        let a = Block::new(request_payload("a", "b", amount, forward), previous, Timestamp::new(secs));
        let b = Block::new(request_payload("a", "b", amount, forward), previous, Timestamp::new(secs));
        prop_assert_eq!(a.hash(), b.hash());
        prop_assert_eq!(a.compute_hash(), a.hash());
    }

    /// Changing the amount alone changes the hash.
    #[test]
    fn block_hash_changes_with_amount(amount in 0u64..u64::MAX - 1, delta in 1u64..1_000) {
        let other = amount.saturating_add(delta);
        let ts = Timestamp::new(1);
        let a = Block::new(request_payload("a", "b", amount, true), BlockHash::ZERO, ts);
        let b = Block::new(request_payload("a", "b", other, true), BlockHash::ZERO, ts);
        prop_assert_ne!(a.hash(), b.hash());
    }

    /// Changing the predecessor alone changes the hash.
    #[test]
    fn block_hash_changes_with_previous(
        p1 in prop::array::uniform32(0u8..),
        p2 in prop::array::uniform32(0u8..),
    ) {
        prop_assume!(p1 != p2);
        let payload = BlockPayload::Finalization(FinalizationPayload {
            request: BlockHash::new([4; 32]),
            accepted: true,
        });
        let ts = Timestamp::new(1);
        let a = Block::new(payload.clone(), BlockHash::new(p1), ts);
        let b = Block::new(payload, BlockHash::new(p2), ts);
        prop_assert_ne!(a.hash(), b.hash());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Under any sequence of operations the chain stays linked, every request
    /// is either pending or finalized exactly once, and both index entries
    /// agree with the ledger.
    #[test]
    fn ledger_invariants_hold(ops in prop::collection::vec(op(), 1..20)) {
        let ledger = Ledger::new();
        let parties = parties();
        let mut requests: Vec<(BlockHash, usize, usize)> = Vec::new();

        for op in ops {
            match op {
                Op::Create { from, to, amount } => {
                    let source = &parties[from];
                    let target = &parties[to];
                    let payload = RequestPayload {
                        source: source.address.clone(),
                        target: target.address.clone(),
                        amount,
                        direction: Direction::SourceToTarget,
                    };
                    let sig = sign_message(&payload.signing_message(), &source.keys.private);
                    let block = ledger
                        .create_request(
                            &source.address,
                            &target.address,
                            amount,
                            Direction::SourceToTarget,
                            &sig,
                            Some(&source.credentials),
                        )
                        .unwrap();
                    requests.push((block.hash(), from, to));
                }
                Op::Accept { request } | Op::Revoke { request } if request >= requests.len() => {}
                Op::Accept { request } => {
                    let (hash, _, to) = requests[request];
                    let target = &parties[to];
                    let sig = sign_message(
                        &FinalizationPayload::signing_message(&hash, true),
                        &target.keys.private,
                    );
                    let was_pending = ledger.is_pending(&hash);
                    let result = ledger.accept(&hash, &sig, Some(&target.credentials));
                    if was_pending {
                        prop_assert!(result.is_ok());
                    } else {
                        let is_already_finalized =
                            matches!(result, Err(LedgerError::AlreadyFinalized { .. }));
                        prop_assert!(is_already_finalized);
                    }
                }
                Op::Revoke { request } => {
                    let (hash, from, _) = requests[request];
                    let source = &parties[from];
                    let sig = sign_message(
                        &FinalizationPayload::signing_message(&hash, false),
                        &source.keys.private,
                    );
                    let was_pending = ledger.is_pending(&hash);
                    let result = ledger.revoke(&hash, &sig);
                    prop_assert_eq!(result.is_ok(), was_pending);
                }
            }
        }

        ledger.validate_chain().unwrap();
        let chain = ledger.chain();
        for pair in chain.windows(2) {
            prop_assert_eq!(pair[1].previous(), pair[0].hash());
        }

        let mut finalized = 0;
        for (hash, from, to) in &requests {
            let pending = ledger.is_pending(hash);
            let finalization = ledger.finalization_of(hash);
            prop_assert!(pending != finalization.is_some());

            let expected = match finalization {
                None => TransactionStatus::Pending,
                Some(fin) => {
                    finalized += 1;
                    let block = ledger.retrieve(&fin).unwrap();
                    let decision = block.payload().as_finalization().unwrap();
                    prop_assert_eq!(decision.request, *hash);
                    TransactionStatus::from_decision(decision.accepted)
                }
            };
            for party in [*from, *to] {
                let history = ledger.transactions_for(&parties[party].address);
                prop_assert_eq!(history[hash].status, expected);
            }
        }
        let summary = ledger.summary();
        prop_assert_eq!(summary.finalized, finalized);
        prop_assert_eq!(summary.pending as usize, requests.len() - finalized as usize);
        prop_assert_eq!(summary.blocks as usize, chain.len());
    }
}
