//! Events published for committed bridge calls.

use serde::{Deserialize, Serialize};
use xchain_types::{AccountName, Asset, ExternalTransferId, SequenceId};

/// Observability events. They are published only after a call commits, so
/// subscribers never see events from a rejected call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// A reporter's attestation was merged into a pending inbound transfer.
    AttestationRecorded {
        external_transfer_id: ExternalTransferId,
        reporter: AccountName,
        origin_chain: String,
        target_account: AccountName,
        quantity: Asset,
        note: String,
    },
    /// Held outbound funds were destroyed.
    AssetDestroyed {
        depositor: AccountName,
        quantity: Asset,
    },
    /// Quorum was reached and funds were released to the target.
    SettlementFinalized {
        target_account: AccountName,
        quantity: Asset,
    },
    CrossChainTransferCompleted {
        target_account: AccountName,
        external_transfer_id: ExternalTransferId,
    },
    /// A deposit was accepted as an outbound transfer.
    OutboundTransferInitiated {
        sequence_id: SequenceId,
        target_blockchain: String,
        target_account: String,
        quantity: Asset,
    },
}

impl BridgeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::AttestationRecorded { .. } => "attestation_recorded",
            BridgeEvent::AssetDestroyed { .. } => "asset_destroyed",
            BridgeEvent::SettlementFinalized { .. } => "settlement_finalized",
            BridgeEvent::CrossChainTransferCompleted { .. } => "cross_chain_transfer_completed",
            BridgeEvent::OutboundTransferInitiated { .. } => "outbound_transfer_initiated",
        }
    }
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the committing call; keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&BridgeEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&BridgeEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &BridgeEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
