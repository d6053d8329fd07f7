//! Bridge configuration: the single global parameter record.

use crate::AccountName;
use serde::{Deserialize, Serialize};

/// How inbound transfers are funded and outbound transfers destroyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceMode {
    /// Inbound: issue new supply to the ledger account, then transfer it out.
    /// Outbound destroy: burn the held quantity.
    #[default]
    MintThenTransfer,
    /// Inbound: transfer from the pre-funded pool (the ledger account).
    /// Outbound destroy: return the held quantity to the pool.
    TransferFromPool,
}

impl IssuanceMode {
    pub fn issues(&self) -> bool {
        matches!(self, IssuanceMode::MintThenTransfer)
    }
}

/// Arguments to the one-time initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    /// The token ledger account whose asset is bridged.
    pub ledger_id: AccountName,
    /// Distinct attestations required to finalize an inbound transfer. Must be > 0.
    pub quorum_threshold: u64,
    pub issuance_mode: IssuanceMode,
}

/// Global bridge parameters.
///
/// Exactly one instance exists once the bridge is initialized. `quorum_threshold`
/// is never zero and `next_outbound_sequence` only ever increases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub ledger_id: AccountName,
    pub reporting_enabled: bool,
    pub outbound_enabled: bool,
    pub issuance_mode: IssuanceMode,
    pub next_outbound_sequence: u64,
    pub quorum_threshold: u64,
}

impl Configuration {
    /// Fresh configuration: both features disabled, counter at zero.
    pub fn from_params(params: InitParams) -> Self {
        Self {
            ledger_id: params.ledger_id,
            reporting_enabled: false,
            outbound_enabled: false,
            issuance_mode: params.issuance_mode,
            next_outbound_sequence: 0,
            quorum_threshold: params.quorum_threshold,
        }
    }
}
