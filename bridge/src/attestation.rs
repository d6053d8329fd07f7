//! Attestation engine: merges reporter attestations and finalizes inbound
//! transfers once quorum is reached.
//!
//! Merging and the quorum check happen in the same call: the attestation that
//! brings the attestor count up to the threshold is the one that releases the
//! funds, removes the pending record and writes the completion record.

use crate::context::{configuration, CallContext};
use crate::error::{BridgeError, Feature};
use crate::event::BridgeEvent;
use crate::ledger::LedgerIntent;
use serde::{Deserialize, Serialize};
use xchain_store::{BridgeState, PendingInboundTransfer, SettlementCompletionRecord};
use xchain_types::{AccountName, Asset, ExternalTransferId, IssuanceMode};

/// Longest accepted note, in bytes.
pub const MAX_NOTE_LEN: usize = 256;

/// A reporter's claim that a transfer happened on a remote chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub reporter: AccountName,
    pub origin_chain: String,
    pub external_transfer_id: ExternalTransferId,
    pub target_account: AccountName,
    pub quantity: Asset,
    #[serde(default)]
    pub note: String,
    /// Free-form source chain data, usually the source transaction hash.
    #[serde(default)]
    pub aux_data: String,
}

/// What an accepted attestation did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttestationOutcome {
    /// Merged; quorum not reached yet.
    Recorded { attestors: usize },
    /// Merged and finalized.
    Finalized { completion_recorded: bool },
}

pub struct AttestationEngine;

impl AttestationEngine {
    pub fn submit_attestation(
        &self,
        ctx: &mut CallContext<'_>,
        state: &mut BridgeState,
        attestation: Attestation,
    ) -> Result<AttestationOutcome, BridgeError> {
        ctx.require_auth(&attestation.reporter)?;
        if attestation.note.len() > MAX_NOTE_LEN {
            return Err(BridgeError::InvalidArgument(format!(
                "note is {} bytes, limit is {MAX_NOTE_LEN}",
                attestation.note.len()
            )));
        }
        let config = configuration(state)?;
        if !config.reporting_enabled {
            return Err(BridgeError::FeatureDisabled(Feature::Reporting));
        }
        let quorum = config.quorum_threshold;
        let ledger_id = config.ledger_id.clone();
        let mode = config.issuance_mode;

        if !state.reporters.contains(&attestation.reporter) {
            return Err(BridgeError::UnknownReporter(attestation.reporter));
        }
        if !ctx.account_exists(&attestation.target_account) {
            return Err(BridgeError::InvalidTarget(
                attestation.target_account.to_string(),
            ));
        }

        let id = attestation.external_transfer_id;
        let attestors = self.merge(state, &attestation)?;
        ctx.emit(BridgeEvent::AttestationRecorded {
            external_transfer_id: id,
            reporter: attestation.reporter.clone(),
            origin_chain: attestation.origin_chain.clone(),
            target_account: attestation.target_account.clone(),
            quantity: attestation.quantity.clone(),
            note: attestation.note.clone(),
        });
        tracing::debug!(
            %id,
            reporter = %attestation.reporter,
            attestors,
            quorum,
            "attestation merged"
        );

        if (attestors as u64) < quorum {
            return Ok(AttestationOutcome::Recorded { attestors });
        }
        let completion_recorded = self.finalize(ctx, state, id, &ledger_id, mode)?;
        Ok(AttestationOutcome::Finalized {
            completion_recorded,
        })
    }

    /// Create the pending record or append the reporter to it. Returns the
    /// attestor count after the merge.
    fn merge(&self, state: &mut BridgeState, a: &Attestation) -> Result<usize, BridgeError> {
        let id = a.external_transfer_id;
        let Some(pending) = state.pending_inbound.get(&id) else {
            state.pending_inbound.insert(
                id,
                PendingInboundTransfer {
                    external_transfer_id: id,
                    target_account: a.target_account.clone(),
                    quantity: a.quantity.clone(),
                    origin_chain: a.origin_chain.clone(),
                    note: a.note.clone(),
                    aux_data: a.aux_data.clone(),
                    attestors: vec![a.reporter.clone()],
                },
            )?;
            return Ok(1);
        };

        if pending.has_attestor(&a.reporter) {
            return Err(BridgeError::DuplicateAttestation {
                reporter: a.reporter.clone(),
                id,
            });
        }
        if !pending.matches(
            &a.target_account,
            &a.quantity,
            &a.origin_chain,
            &a.note,
            &a.aux_data,
        ) {
            tracing::warn!(%id, reporter = %a.reporter, "attestation conflicts with pending record");
            return Err(BridgeError::ConflictingData(id));
        }
        let count = state.pending_inbound.update(&id, |p| {
            p.attestors.push(a.reporter.clone());
            p.attestors.len()
        })?;
        Ok(count)
    }

    /// Release the funds and retire the pending record. Returns whether a
    /// completion record was written.
    fn finalize(
        &self,
        ctx: &mut CallContext<'_>,
        state: &mut BridgeState,
        id: ExternalTransferId,
        ledger_id: &AccountName,
        mode: IssuanceMode,
    ) -> Result<bool, BridgeError> {
        let record = state.pending_inbound.erase(&id)?;

        if mode.issues() {
            ctx.schedule(LedgerIntent::Issue {
                to: ledger_id.clone(),
                quantity: record.quantity.clone(),
                memo: record.note.clone(),
            });
        }
        ctx.schedule(LedgerIntent::Transfer {
            from: ledger_id.clone(),
            to: record.target_account.clone(),
            quantity: record.quantity.clone(),
            memo: record.note.clone(),
        });
        ctx.emit(BridgeEvent::SettlementFinalized {
            target_account: record.target_account.clone(),
            quantity: record.quantity.clone(),
        });

        let keyed = !id.is_unkeyed();
        if keyed {
            if state.completions.contains(&id) {
                return Err(BridgeError::DuplicateSettlement(id));
            }
            state.completions.insert(
                id,
                SettlementCompletionRecord {
                    external_transfer_id: id,
                    target_account: record.target_account.clone(),
                    quantity: record.quantity.clone(),
                },
            )?;
        }
        ctx.emit(BridgeEvent::CrossChainTransferCompleted {
            target_account: record.target_account,
            external_transfer_id: id,
        });
        Ok(keyed)
    }

    /// Delete a completion record. Callable by the token ledger or the owner.
    pub fn close_settlement_record(
        &self,
        ctx: &CallContext<'_>,
        state: &mut BridgeState,
        id: ExternalTransferId,
    ) -> Result<SettlementCompletionRecord, BridgeError> {
        let ledger_id = &configuration(state)?.ledger_id;
        if !ctx.has_auth(ledger_id) && !ctx.has_auth(ctx.bridge_account()) {
            return Err(BridgeError::Unauthenticated(format!(
                "{ledger_id} or {}",
                ctx.bridge_account()
            )));
        }
        if !state.completions.contains(&id) {
            return Err(BridgeError::NotFound(format!("settlement record {id}")));
        }
        Ok(state.completions.erase(&id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{name, ready_state, tkn, Accounts, Signers};

    fn attestation(reporter: &str, id: u64) -> Attestation {
        Attestation {
            reporter: name(reporter),
            origin_chain: "btc".into(),
            external_transfer_id: ExternalTransferId::new(id),
            target_account: name("alice"),
            quantity: tkn("10.0000"),
            note: String::new(),
            aux_data: "txhash".into(),
        }
    }

    fn submit(
        state: &mut BridgeState,
        a: Attestation,
    ) -> (Result<AttestationOutcome, BridgeError>, crate::context::Effects) {
        let signer = a.reporter.to_string();
        let auth = Signers::of(&[signer.as_str()]);
        let accounts = Accounts::all();
        let me = name("bridge");
        let mut ctx = CallContext::new(&auth, &accounts, &me);
        let result = AttestationEngine.submit_attestation(&mut ctx, state, a);
        (result, ctx.into_effects())
    }

    #[test]
    fn quorum_of_two_finalizes_on_second_attestation() {
        let mut state = ready_state(2, IssuanceMode::MintThenTransfer);

        let (first, effects) = submit(&mut state, attestation("rep1", 7));
        assert_eq!(first.unwrap(), AttestationOutcome::Recorded { attestors: 1 });
        assert!(effects.intents.is_empty());
        assert_eq!(effects.events.len(), 1);

        let (second, effects) = submit(&mut state, attestation("rep2", 7));
        assert_eq!(
            second.unwrap(),
            AttestationOutcome::Finalized {
                completion_recorded: true
            }
        );
        assert_eq!(
            effects.intents,
            vec![
                LedgerIntent::Issue {
                    to: name("token"),
                    quantity: tkn("10.0000"),
                    memo: String::new(),
                },
                LedgerIntent::Transfer {
                    from: name("token"),
                    to: name("alice"),
                    quantity: tkn("10.0000"),
                    memo: String::new(),
                },
            ]
        );
        let names: Vec<_> = effects.events.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "attestation_recorded",
                "settlement_finalized",
                "cross_chain_transfer_completed"
            ]
        );
        let id = ExternalTransferId::new(7);
        assert!(!state.pending_inbound.contains(&id));
        assert_eq!(state.completions.get(&id).unwrap().target_account, name("alice"));
    }

    #[test]
    fn pool_mode_transfers_without_issuing() {
        let mut state = ready_state(1, IssuanceMode::TransferFromPool);
        let (result, effects) = submit(&mut state, attestation("rep1", 3));
        assert!(matches!(result.unwrap(), AttestationOutcome::Finalized { .. }));
        assert_eq!(effects.intents.len(), 1);
        assert!(matches!(effects.intents[0], LedgerIntent::Transfer { .. }));
    }

    #[test]
    fn unkeyed_transfer_leaves_no_completion_record() {
        let mut state = ready_state(1, IssuanceMode::MintThenTransfer);
        let (result, _) = submit(&mut state, attestation("rep1", 0));
        assert_eq!(
            result.unwrap(),
            AttestationOutcome::Finalized {
                completion_recorded: false
            }
        );
        assert!(state.completions.is_empty());
        assert!(state.pending_inbound.is_empty());
    }

    #[test]
    fn same_reporter_twice_is_duplicate() {
        let mut state = ready_state(3, IssuanceMode::MintThenTransfer);
        submit(&mut state, attestation("rep1", 7)).0.unwrap();
        let before = state.clone();
        let (result, _) = submit(&mut state, attestation("rep1", 7));
        assert!(matches!(result, Err(BridgeError::DuplicateAttestation { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn differing_fields_conflict() {
        let mut state = ready_state(3, IssuanceMode::MintThenTransfer);
        submit(&mut state, attestation("rep1", 7)).0.unwrap();

        let mut other_qty = attestation("rep2", 7);
        other_qty.quantity = tkn("11.0000");
        let mut other_target = attestation("rep2", 7);
        other_target.target_account = name("mallory");
        let mut other_aux = attestation("rep2", 7);
        other_aux.aux_data = "different".into();
        let mut other_chain = attestation("rep2", 7);
        other_chain.origin_chain = "eth".into();
        let mut other_note = attestation("rep2", 7);
        other_note.note = "other memo".into();

        for a in [other_qty, other_target, other_aux, other_chain, other_note] {
            let (result, _) = submit(&mut state, a);
            assert!(matches!(result, Err(BridgeError::ConflictingData(_))));
        }
        let pending = state.pending_inbound.get(&ExternalTransferId::new(7)).unwrap();
        assert_eq!(pending.attestors, vec![name("rep1")]);
    }

    #[test]
    fn validation_order() {
        let mut state = ready_state(2, IssuanceMode::MintThenTransfer);

        let mut long_note = attestation("rep1", 1);
        long_note.note = "x".repeat(MAX_NOTE_LEN + 1);
        assert!(matches!(
            submit(&mut state, long_note).0,
            Err(BridgeError::InvalidArgument(_))
        ));

        let mut exact_note = attestation("rep1", 1);
        exact_note.note = "x".repeat(MAX_NOTE_LEN);
        assert!(submit(&mut state, exact_note).0.is_ok());

        assert!(matches!(
            submit(&mut state, attestation("stranger", 2)).0,
            Err(BridgeError::UnknownReporter(_))
        ));

        state.configuration.as_mut().unwrap().reporting_enabled = false;
        assert!(matches!(
            submit(&mut state, attestation("stranger", 2)).0,
            Err(BridgeError::FeatureDisabled(Feature::Reporting))
        ));
    }

    #[test]
    fn unauthenticated_reporter_rejected() {
        let mut state = ready_state(1, IssuanceMode::MintThenTransfer);
        let auth = Signers::of(&["rep2"]);
        let accounts = Accounts::all();
        let me = name("bridge");
        let mut ctx = CallContext::new(&auth, &accounts, &me);
        let result = AttestationEngine.submit_attestation(&mut ctx, &mut state, attestation("rep1", 1));
        assert!(matches!(result, Err(BridgeError::Unauthenticated(_))));
    }

    #[test]
    fn missing_target_is_invalid() {
        let mut state = ready_state(1, IssuanceMode::MintThenTransfer);
        let auth = Signers::of(&["rep1"]);
        let accounts = Accounts {
            missing: [name("alice")].into_iter().collect(),
        };
        let me = name("bridge");
        let mut ctx = CallContext::new(&auth, &accounts, &me);
        let result = AttestationEngine.submit_attestation(&mut ctx, &mut state, attestation("rep1", 1));
        assert!(matches!(result, Err(BridgeError::InvalidTarget(_))));
        assert!(state.pending_inbound.is_empty());
    }

    #[test]
    fn finalizing_an_unclosed_id_is_a_duplicate_settlement() {
        let mut state = ready_state(1, IssuanceMode::MintThenTransfer);
        submit(&mut state, attestation("rep1", 9)).0.unwrap();
        let (result, _) = submit(&mut state, attestation("rep2", 9));
        assert!(matches!(result, Err(BridgeError::DuplicateSettlement(_))));
    }

    #[test]
    fn close_requires_ledger_or_owner() {
        let mut state = ready_state(1, IssuanceMode::MintThenTransfer);
        submit(&mut state, attestation("rep1", 9)).0.unwrap();
        let id = ExternalTransferId::new(9);
        let accounts = Accounts::all();
        let me = name("bridge");

        let stranger = Signers::of(&["rep1"]);
        let ctx = CallContext::new(&stranger, &accounts, &me);
        assert!(matches!(
            AttestationEngine.close_settlement_record(&ctx, &mut state, id),
            Err(BridgeError::Unauthenticated(_))
        ));

        let ledger = Signers::of(&["token"]);
        let ctx = CallContext::new(&ledger, &accounts, &me);
        AttestationEngine.close_settlement_record(&ctx, &mut state, id).unwrap();
        assert!(matches!(
            AttestationEngine.close_settlement_record(&ctx, &mut state, id),
            Err(BridgeError::NotFound(_))
        ));
    }
}
