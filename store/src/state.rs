//! The complete bridge state.

use crate::records::{OutboundTransferRecord, PendingInboundTransfer, SettlementCompletionRecord};
use crate::table::KeyedTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use xchain_types::{AccountName, Configuration, ExternalTransferId, SequenceId};

/// At most one pending record per external transfer id.
pub type PendingInboundTable = KeyedTable<ExternalTransferId, PendingInboundTransfer>;
/// Keyed by nonzero external transfer ids only.
pub type CompletionTable = KeyedTable<ExternalTransferId, SettlementCompletionRecord>;
/// Keyed by sequence id; ids are never reused after erase.
pub type OutboundTable = KeyedTable<SequenceId, OutboundTransferRecord>;
/// Authorized reporters. Unordered by meaning, sorted for stable listing.
pub type ReporterSet = BTreeSet<AccountName>;

/// Everything the bridge persists between calls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeState {
    /// `None` until the bridge is initialized.
    pub configuration: Option<Configuration>,
    pub reporters: ReporterSet,
    pub pending_inbound: PendingInboundTable,
    pub completions: CompletionTable,
    pub outbound: OutboundTable,
    /// Set while a snapshot is committed ahead of its ledger batch. A stored
    /// state with this flag was never confirmed against the ledger.
    pub ledger_batch_in_flight: bool,
}

impl BridgeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.configuration.is_some()
    }

    /// A copy flagged as written ahead of its ledger batch.
    pub fn staged(&self) -> Self {
        Self {
            ledger_batch_in_flight: true,
            ..self.clone()
        }
    }
}
