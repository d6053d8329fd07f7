use proptest::prelude::*;

use std::collections::HashSet;
use xchain_bridge::{
    Attestation, Bridge, BridgeCall, BridgeConfig, BridgeError, DepositNotification,
    LedgerIntent, ResolveAction, TokenLedger,
};
use xchain_nullables::{NullAccounts, NullAuth, NullLedger, NullStateStore};
use xchain_types::{AccountName, Asset, ExternalTransferId, IssuanceMode, SequenceId, Symbol};

type TestBridge = Bridge<NullStateStore, NullLedger, NullAccounts>;

const REPORTERS: usize = 5;

fn name(s: &str) -> AccountName {
    AccountName::new(s).unwrap()
}

fn reporter(i: usize) -> AccountName {
    name(&format!("rep{}", i + 1))
}

fn ready(quorum_threshold: u64) -> TestBridge {
    let config = BridgeConfig {
        quorum_threshold,
        reporters: (0..REPORTERS).map(reporter).collect(),
        enable_reporting: true,
        enable_outbound: true,
        ..BridgeConfig::default()
    };
    let mut bridge = Bridge::open(
        config.bridge_account.clone(),
        config.reserve_accounts.iter().cloned(),
        NullStateStore::new(),
        NullLedger::new(),
        NullAccounts::permissive(),
    )
    .unwrap();
    let owner = NullAuth::signed_by([config.bridge_account.clone()]);
    for call in config.bootstrap_calls() {
        bridge.execute(&owner, call).unwrap();
    }
    bridge
}

fn tkn(amount: i64) -> Asset {
    Asset::new(amount, Symbol::new(4, "TKN").unwrap()).unwrap()
}

proptest! {
    /// Funds are released exactly once, by the attestation that brings the
    /// distinct attestor count to the threshold. Repeats are rejected.
    #[test]
    fn finalizes_exactly_once_at_threshold(
        quorum in 1u64..=REPORTERS as u64,
        order in proptest::collection::vec(0..REPORTERS, 1..20),
        amount in 1i64..1_000_000_000,
    ) {
        let mut bridge = ready(quorum);
        let id = ExternalTransferId::new(42);
        let mut distinct = HashSet::new();
        let mut finalized = 0;

        for i in order {
            let call = BridgeCall::SubmitAttestation(Attestation {
                reporter: reporter(i),
                origin_chain: "btc".into(),
                external_transfer_id: id,
                target_account: name("alice"),
                quantity: tkn(amount),
                note: String::new(),
                aux_data: String::new(),
            });
            let result = bridge.execute(&NullAuth::signed_by([reporter(i)]), call);

            if !distinct.insert(i) {
                let is_duplicate = matches!(result, Err(BridgeError::DuplicateAttestation { .. }));
                prop_assert!(is_duplicate);
                continue;
            }
            let receipt = result.unwrap();
            if distinct.len() as u64 == quorum {
                prop_assert_eq!(receipt.intents.len(), 2);
                finalized += 1;
                break;
            }
            prop_assert!(receipt.intents.is_empty());
        }

        let reached = distinct.len() as u64 >= quorum;
        prop_assert_eq!(finalized, u32::from(reached));
        let expected = if reached { amount } else { 0 };
        prop_assert_eq!(bridge.ledger().balance(&name("alice")), expected);
        prop_assert_eq!(bridge.pending_inbound(id).is_some(), !reached);
        prop_assert_eq!(bridge.settlement_record(id).is_some(), reached);
    }

    /// Escrowed tokens leave the bridge exactly once, and only a refund pays
    /// the depositor.
    #[test]
    fn resolution_conserves_escrow(
        deposits in proptest::collection::vec((1i64..1_000_000, any::<bool>()), 1..10),
    ) {
        let mut bridge = ready(1);
        let bridge_account = bridge.account().clone();
        let bob = name("bob");
        let mut refunded = 0;

        for (amount, _) in &deposits {
            bridge.ledger_mut().credit(&bob, &tkn(*amount)).unwrap();
            bridge.ledger_mut().execute(&[LedgerIntent::Transfer {
                from: bob.clone(),
                to: bridge_account.clone(),
                quantity: tkn(*amount),
                memo: "eos,carol".into(),
            }]).unwrap();
            bridge.execute(&NullAuth::unsigned(), BridgeCall::DepositNotification(DepositNotification {
                ledger: name("token"),
                from: bob.clone(),
                to: bridge_account.clone(),
                quantity: tkn(*amount),
                directive: "eos,carol".into(),
            })).unwrap();
        }

        for (seq, (amount, refund)) in deposits.iter().enumerate() {
            let action = if *refund { ResolveAction::Refund } else { ResolveAction::Destroy };
            bridge.execute(&NullAuth::signed_by([reporter(0)]), BridgeCall::Resolve {
                reporter: reporter(0),
                sequence_id: SequenceId::new(seq as u64),
                action,
                reason: String::new(),
            }).unwrap();
            if *refund {
                refunded += amount;
            }
        }

        prop_assert_eq!(bridge.ledger().balance(&bridge_account), 0);
        prop_assert_eq!(bridge.ledger().balance(&bob), refunded);
        prop_assert_eq!(bridge.ledger().supply(), refunded);
        prop_assert!(bridge.pending_outbound().is_empty());
    }
}
