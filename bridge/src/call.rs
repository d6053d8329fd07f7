//! The public operations, as data.

use crate::attestation::Attestation;
use crate::outbound::{DepositNotification, ResolveAction};
use serde::{Deserialize, Serialize};
use xchain_types::{AccountName, ExternalTransferId, IssuanceMode, SequenceId};

/// One bridge call. Each call is executed as a single atomic unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeCall {
    Initialize {
        ledger_id: AccountName,
        quorum_threshold: u64,
        issuance_mode: IssuanceMode,
    },
    UpdateConfig {
        quorum_threshold: u64,
        issuance_mode: IssuanceMode,
    },
    SetReportingEnabled {
        enabled: bool,
    },
    SetOutboundEnabled {
        enabled: bool,
    },
    AddReporter {
        reporter: AccountName,
    },
    RemoveReporter {
        reporter: AccountName,
    },
    SubmitAttestation(Attestation),
    CloseSettlementRecord {
        external_transfer_id: ExternalTransferId,
    },
    Resolve {
        reporter: AccountName,
        sequence_id: SequenceId,
        action: ResolveAction,
        #[serde(default)]
        reason: String,
    },
    /// Sent by the token ledger's transfer notification, not by a signer.
    DepositNotification(DepositNotification),
}

impl BridgeCall {
    pub fn name(&self) -> &'static str {
        match self {
            BridgeCall::Initialize { .. } => "initialize",
            BridgeCall::UpdateConfig { .. } => "update_config",
            BridgeCall::SetReportingEnabled { .. } => "set_reporting_enabled",
            BridgeCall::SetOutboundEnabled { .. } => "set_outbound_enabled",
            BridgeCall::AddReporter { .. } => "add_reporter",
            BridgeCall::RemoveReporter { .. } => "remove_reporter",
            BridgeCall::SubmitAttestation(_) => "submit_attestation",
            BridgeCall::CloseSettlementRecord { .. } => "close_settlement_record",
            BridgeCall::Resolve { .. } => "resolve",
            BridgeCall::DepositNotification(_) => "deposit_notification",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calls_deserialize_from_tagged_json() {
        let call: BridgeCall = serde_json::from_str(
            r#"{
                "op": "submit_attestation",
                "reporter": "rep1",
                "origin_chain": "btc",
                "external_transfer_id": 7,
                "target_account": "alice",
                "quantity": "10.0000 TKN"
            }"#,
        )
        .unwrap();
        let BridgeCall::SubmitAttestation(a) = &call else {
            panic!("wrong variant: {call:?}");
        };
        assert_eq!(a.external_transfer_id, ExternalTransferId::new(7));
        assert!(a.note.is_empty());
        assert_eq!(call.name(), "submit_attestation");
    }

    #[test]
    fn resolve_action_is_snake_case() {
        let call: BridgeCall = serde_json::from_str(
            r#"{"op":"resolve","reporter":"rep1","sequence_id":0,"action":"destroy"}"#,
        )
        .unwrap();
        assert!(matches!(
            call,
            BridgeCall::Resolve {
                action: ResolveAction::Destroy,
                ..
            }
        ));
    }
}
