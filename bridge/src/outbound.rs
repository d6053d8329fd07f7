//! Outbound engine: turns deposits into held outbound transfers and lets a
//! single reporter resolve them.
//!
//! Resolution needs one registered reporter, unlike the n-of-m quorum on the
//! inbound side. The two thresholds are deliberately separate.

use crate::context::{configuration, configuration_mut, CallContext};
use crate::directive::TransferDirective;
use crate::error::{BridgeError, Feature};
use crate::event::BridgeEvent;
use crate::ledger::LedgerIntent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use xchain_store::{BridgeState, OutboundTransferRecord};
use xchain_types::{AccountName, Asset, DestinationChain, SequenceId};

/// Longest remote account name accepted in a directive.
pub const MAX_TARGET_ACCOUNT_LEN: usize = 12;

/// A transfer-in notification from a token ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositNotification {
    /// The ledger that sent the notification.
    pub ledger: AccountName,
    pub from: AccountName,
    pub to: AccountName,
    pub quantity: Asset,
    /// `"<blockchain>,<account>"`.
    pub directive: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveAction {
    /// Send the held quantity back to the depositor.
    Refund,
    /// Burn the held quantity, or return it to the pool.
    Destroy,
}

pub struct OutboundEngine {
    reserve_accounts: BTreeSet<AccountName>,
}

impl OutboundEngine {
    /// `reserve_accounts` are system accounts whose transfers are never
    /// treated as deposits.
    pub fn new(reserve_accounts: impl IntoIterator<Item = AccountName>) -> Self {
        Self {
            reserve_accounts: reserve_accounts.into_iter().collect(),
        }
    }

    pub fn reserve_accounts(&self) -> &BTreeSet<AccountName> {
        &self.reserve_accounts
    }

    /// Handle a deposit. Returns the new sequence id, or `None` if the
    /// notification was ignored.
    pub fn accept_deposit(
        &self,
        ctx: &mut CallContext<'_>,
        state: &mut BridgeState,
        deposit: DepositNotification,
    ) -> Result<Option<SequenceId>, BridgeError> {
        if &deposit.from == ctx.bridge_account() || self.reserve_accounts.contains(&deposit.from) {
            tracing::debug!(from = %deposit.from, "ignoring transfer from system account");
            return Ok(None);
        }
        if &deposit.to != ctx.bridge_account() {
            return Err(BridgeError::InvalidArgument(format!(
                "transfer to {} does not involve the bridge",
                deposit.to
            )));
        }
        let config = configuration(state)?;
        if deposit.ledger != config.ledger_id {
            return Err(BridgeError::UnexpectedAsset {
                expected: config.ledger_id.clone(),
                actual: deposit.ledger,
            });
        }

        let directive: TransferDirective = deposit.directive.parse()?;
        let chain: DestinationChain = directive
            .target_blockchain
            .parse()
            .map_err(|_| BridgeError::UnsupportedChain(directive.target_blockchain.to_lowercase()))?;
        let target_len = directive.target_account.len();
        if target_len == 0 || target_len > MAX_TARGET_ACCOUNT_LEN {
            return Err(BridgeError::InvalidTarget(directive.target_account));
        }
        if !config.outbound_enabled {
            return Err(BridgeError::FeatureDisabled(Feature::Outbound));
        }

        let config = configuration_mut(state)?;
        let sequence_id = SequenceId::new(config.next_outbound_sequence);
        config.next_outbound_sequence = config
            .next_outbound_sequence
            .checked_add(1)
            .ok_or_else(|| BridgeError::InvalidArgument("outbound sequence exhausted".into()))?;

        state.outbound.insert(
            sequence_id,
            OutboundTransferRecord {
                sequence_id,
                depositor: deposit.from,
                quantity: deposit.quantity.clone(),
            },
        )?;
        ctx.emit(BridgeEvent::OutboundTransferInitiated {
            sequence_id,
            target_blockchain: chain.to_string(),
            target_account: directive.target_account,
            quantity: deposit.quantity,
        });
        Ok(Some(sequence_id))
    }

    /// Refund or destroy a held outbound transfer.
    pub fn resolve(
        &self,
        ctx: &mut CallContext<'_>,
        state: &mut BridgeState,
        reporter: &AccountName,
        sequence_id: SequenceId,
        action: ResolveAction,
        reason: &str,
    ) -> Result<OutboundTransferRecord, BridgeError> {
        ctx.require_auth(reporter)?;
        let config = configuration(state)?;
        if !config.reporting_enabled {
            return Err(BridgeError::FeatureDisabled(Feature::Reporting));
        }
        if !config.outbound_enabled {
            return Err(BridgeError::FeatureDisabled(Feature::Outbound));
        }
        let ledger_id = config.ledger_id.clone();
        let mode = config.issuance_mode;

        if !state.reporters.contains(reporter) {
            return Err(BridgeError::UnknownReporter(reporter.clone()));
        }
        if !state.outbound.contains(&sequence_id) {
            return Err(BridgeError::NotFound(format!("outbound transfer {sequence_id}")));
        }
        let record = state.outbound.erase(&sequence_id)?;
        let bridge = ctx.bridge_account().clone();

        match action {
            ResolveAction::Refund => {
                ctx.schedule(LedgerIntent::Transfer {
                    from: bridge,
                    to: record.depositor.clone(),
                    quantity: record.quantity.clone(),
                    memo: format!("refund: {reason}"),
                });
            }
            ResolveAction::Destroy => {
                if mode.issues() {
                    ctx.schedule(LedgerIntent::Burn {
                        account: bridge,
                        quantity: record.quantity.clone(),
                    });
                } else {
                    ctx.schedule(LedgerIntent::Transfer {
                        from: bridge,
                        to: ledger_id,
                        quantity: record.quantity.clone(),
                        memo: "burn".into(),
                    });
                }
                ctx.emit(BridgeEvent::AssetDestroyed {
                    depositor: record.depositor.clone(),
                    quantity: record.quantity.clone(),
                });
            }
        }
        Ok(record)
    }
}
