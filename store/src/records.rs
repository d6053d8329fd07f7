//! Records kept by the bridge tables.

use serde::{Deserialize, Serialize};
use xchain_types::{AccountName, Asset, ExternalTransferId, SequenceId};

/// An inbound transfer that has been attested but has not reached quorum.
///
/// Lives from the first attestation until finalization, when it is removed in
/// the same call that releases the funds. `attestors` holds distinct reporters
/// in submission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInboundTransfer {
    pub external_transfer_id: ExternalTransferId,
    pub target_account: AccountName,
    pub quantity: Asset,
    pub origin_chain: String,
    pub note: String,
    pub aux_data: String,
    pub attestors: Vec<AccountName>,
}

impl PendingInboundTransfer {
    pub fn has_attestor(&self, reporter: &AccountName) -> bool {
        self.attestors.contains(reporter)
    }

    /// True if an attestation carrying these values describes the same transfer.
    pub fn matches(
        &self,
        target_account: &AccountName,
        quantity: &Asset,
        origin_chain: &str,
        note: &str,
        aux_data: &str,
    ) -> bool {
        &self.target_account == target_account
            && &self.quantity == quantity
            && self.origin_chain == origin_chain
            && self.note == note
            && self.aux_data == aux_data
    }
}

/// Proof that a keyed inbound transfer was finalized.
///
/// Only written for nonzero ids; removed only by an explicit close.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementCompletionRecord {
    pub external_transfer_id: ExternalTransferId,
    pub target_account: AccountName,
    pub quantity: Asset,
}

/// Funds received for an outbound transfer, held until a reporter resolves them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundTransferRecord {
    pub sequence_id: SequenceId,
    pub depositor: AccountName,
    pub quantity: Asset,
}
