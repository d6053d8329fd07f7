//! Call dispatcher.
//!
//! [`Bridge::execute`] runs every public operation as one atomic unit:
//!
//! 1. the operation runs against a clone of the current state, collecting
//!    ledger intents and events in its [`CallContext`];
//! 2. the new state is committed to the [`StateStore`], flagged as in flight
//!    when the call has ledger intents;
//! 3. the intents are handed to the [`TokenLedger`] as one batch; if the
//!    ledger rejects them the previous state is written back, otherwise the
//!    new state is written again without the flag;
//! 4. only then is the in-memory state replaced and the events published.
//!
//! A failure at any step leaves state, store and ledger as they were. If the
//! store cannot be restored after a ledger rejection, the flagged snapshot
//! stays behind and [`Bridge::open`] refuses it until it is reconciled.

use crate::attestation::{AttestationEngine, AttestationOutcome};
use crate::call::BridgeCall;
use crate::config_store::ConfigurationStore;
use crate::context::{CallContext, Effects};
use crate::error::BridgeError;
use crate::event::{BridgeEvent, EventBus};
use crate::host::{AccountDirectory, Authenticator};
use crate::ledger::{LedgerIntent, TokenLedger};
use crate::outbound::OutboundEngine;
use crate::registry::ReporterRegistry;
use xchain_store::{
    BridgeState, OutboundTransferRecord, PendingInboundTransfer, SettlementCompletionRecord,
    StateStore,
};
use xchain_types::{AccountName, Configuration, ExternalTransferId, InitParams, SequenceId};

/// What a committed call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Receipt {
    pub events: Vec<BridgeEvent>,
    pub intents: Vec<LedgerIntent>,
}

impl From<Effects> for Receipt {
    fn from(effects: Effects) -> Self {
        Self {
            events: effects.events,
            intents: effects.intents,
        }
    }
}

/// The bridge, wired to its host collaborators.
pub struct Bridge<S, L, D> {
    account: AccountName,
    state: BridgeState,
    store: S,
    ledger: L,
    accounts: D,
    outbound: OutboundEngine,
    events: EventBus,
}

impl<S, L, D> Bridge<S, L, D>
where
    S: StateStore,
    L: TokenLedger,
    D: AccountDirectory,
{
    /// Open the bridge owned by `account`, resuming from the last committed state.
    ///
    /// Fails with [`BridgeError::UnconfirmedSnapshot`] if the stored state was
    /// written ahead of a ledger batch that was never confirmed.
    pub fn open(
        account: AccountName,
        reserve_accounts: impl IntoIterator<Item = AccountName>,
        store: S,
        ledger: L,
        accounts: D,
    ) -> Result<Self, BridgeError> {
        Self::load(account, reserve_accounts, store, ledger, accounts, false)
    }

    /// Open a bridge whose stored state may still be flagged as in flight.
    ///
    /// Use after checking the ledger by hand: the flagged snapshot is taken
    /// as the truth and committed again without the flag.
    pub fn open_reconciled(
        account: AccountName,
        reserve_accounts: impl IntoIterator<Item = AccountName>,
        store: S,
        ledger: L,
        accounts: D,
    ) -> Result<Self, BridgeError> {
        Self::load(account, reserve_accounts, store, ledger, accounts, true)
    }

    fn load(
        account: AccountName,
        reserve_accounts: impl IntoIterator<Item = AccountName>,
        store: S,
        ledger: L,
        accounts: D,
        reconciled: bool,
    ) -> Result<Self, BridgeError> {
        let state = match store.load()? {
            Some(state) if state.ledger_batch_in_flight => {
                if !reconciled {
                    tracing::error!(%account, "stored state has an unconfirmed ledger batch");
                    return Err(BridgeError::UnconfirmedSnapshot);
                }
                tracing::warn!(%account, "accepting reconciled snapshot");
                let state = BridgeState {
                    ledger_batch_in_flight: false,
                    ..state
                };
                store.commit(&state)?;
                state
            }
            Some(state) => {
                tracing::info!(
                    %account,
                    pending_inbound = state.pending_inbound.len(),
                    outbound = state.outbound.len(),
                    "resuming bridge state"
                );
                state
            }
            None => {
                tracing::info!(%account, "starting with empty bridge state");
                BridgeState::new()
            }
        };
        Ok(Self {
            account,
            state,
            store,
            ledger,
            accounts,
            outbound: OutboundEngine::new(reserve_accounts),
            events: EventBus::new(),
        })
    }

    /// Execute one call atomically.
    pub fn execute(
        &mut self,
        auth: &dyn Authenticator,
        call: BridgeCall,
    ) -> Result<Receipt, BridgeError> {
        let op = call.name();
        let span = tracing::info_span!("bridge_call", op);
        let _guard = span.enter();

        let mut working = self.state.clone();
        let effects = {
            let mut ctx = CallContext::new(auth, &self.accounts, &self.account);
            self.dispatch(&mut ctx, &mut working, call)
                .map(|()| ctx.into_effects())
        };
        let effects = match effects {
            Ok(effects) => effects,
            Err(e) => {
                tracing::warn!(error = %e, "call rejected");
                return Err(e);
            }
        };

        if let Err(e) = self.commit(working, &effects.intents) {
            tracing::warn!(error = %e, "call rolled back");
            return Err(e);
        }

        for event in &effects.events {
            self.events.emit(event);
        }
        let names: Vec<&str> = effects.events.iter().map(BridgeEvent::name).collect();
        tracing::info!(events = ?names, intents = effects.intents.len(), "call committed");
        Ok(effects.into())
    }

    fn dispatch(
        &self,
        ctx: &mut CallContext<'_>,
        state: &mut BridgeState,
        call: BridgeCall,
    ) -> Result<(), BridgeError> {
        match call {
            BridgeCall::Initialize {
                ledger_id,
                quorum_threshold,
                issuance_mode,
            } => ConfigurationStore.initialize(
                ctx,
                state,
                InitParams {
                    ledger_id,
                    quorum_threshold,
                    issuance_mode,
                },
            ),
            BridgeCall::UpdateConfig {
                quorum_threshold,
                issuance_mode,
            } => ConfigurationStore.update(ctx, state, quorum_threshold, issuance_mode),
            BridgeCall::SetReportingEnabled { enabled } => {
                ConfigurationStore.set_reporting_enabled(ctx, state, enabled)
            }
            BridgeCall::SetOutboundEnabled { enabled } => {
                ConfigurationStore.set_outbound_enabled(ctx, state, enabled)
            }
            BridgeCall::AddReporter { reporter } => ReporterRegistry.add(ctx, state, reporter),
            BridgeCall::RemoveReporter { reporter } => {
                ReporterRegistry.remove(ctx, state, &reporter)
            }
            BridgeCall::SubmitAttestation(attestation) => {
                let id = attestation.external_transfer_id;
                match AttestationEngine.submit_attestation(ctx, state, attestation)? {
                    AttestationOutcome::Recorded { attestors } => {
                        tracing::debug!(%id, attestors, "awaiting quorum");
                    }
                    AttestationOutcome::Finalized {
                        completion_recorded,
                    } => {
                        tracing::info!(%id, completion_recorded, "inbound transfer finalized");
                    }
                }
                Ok(())
            }
            BridgeCall::CloseSettlementRecord {
                external_transfer_id,
            } => AttestationEngine
                .close_settlement_record(ctx, state, external_transfer_id)
                .map(|_| ()),
            BridgeCall::Resolve {
                reporter,
                sequence_id,
                action,
                reason,
            } => {
                let record =
                    self.outbound
                        .resolve(ctx, state, &reporter, sequence_id, action, &reason)?;
                tracing::info!(
                    %sequence_id,
                    %reporter,
                    ?action,
                    depositor = %record.depositor,
                    quantity = %record.quantity,
                    "outbound transfer resolved"
                );
                Ok(())
            }
            BridgeCall::DepositNotification(deposit) => {
                if let Some(sequence_id) = self.outbound.accept_deposit(ctx, state, deposit)? {
                    tracing::info!(%sequence_id, "outbound transfer initiated");
                }
                Ok(())
            }
        }
    }

    /// Persist `working`, then apply the intents.
    ///
    /// With intents, `working` is first stored flagged as in flight. A ledger
    /// rejection writes the previous state back; success clears the flag.
    fn commit(&mut self, working: BridgeState, intents: &[LedgerIntent]) -> Result<(), BridgeError> {
        if intents.is_empty() {
            self.store.commit(&working)?;
            self.state = working;
            return Ok(());
        }

        self.store.commit(&working.staged())?;
        if let Err(ledger_err) = self.ledger.execute(intents) {
            if let Err(restore_err) = self.store.commit(&self.state) {
                tracing::error!(
                    error = %restore_err,
                    "failed to restore state after ledger rejection; stored snapshot stays unconfirmed"
                );
                return Err(restore_err.into());
            }
            return Err(ledger_err.into());
        }

        // The batch is applied and cannot be taken back, so the call stands
        // even if the flag cannot be cleared.
        if let Err(e) = self.store.commit(&working) {
            tracing::error!(error = %e, "ledger batch applied but snapshot confirmation failed");
        }
        self.state = working;
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// The bridge's own account.
    pub fn account(&self) -> &AccountName {
        &self.account
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    pub fn configuration(&self) -> Option<&Configuration> {
        self.state.configuration.as_ref()
    }

    pub fn is_reporter(&self, reporter: &AccountName) -> bool {
        ReporterRegistry.is_member(&self.state, reporter)
    }

    pub fn reporters(&self) -> impl Iterator<Item = &AccountName> {
        ReporterRegistry.list(&self.state)
    }

    pub fn pending_inbound(&self, id: ExternalTransferId) -> Option<&PendingInboundTransfer> {
        self.state.pending_inbound.get(&id)
    }

    pub fn settlement_record(&self, id: ExternalTransferId) -> Option<&SettlementCompletionRecord> {
        self.state.completions.get(&id)
    }

    pub fn outbound_record(&self, sequence_id: SequenceId) -> Option<&OutboundTransferRecord> {
        self.state.outbound.get(&sequence_id)
    }

    /// Unresolved outbound transfers in sequence order.
    pub fn pending_outbound(&self) -> Vec<&OutboundTransferRecord> {
        self.state.outbound.iter().map(|(_, r)| r).collect()
    }

    // ── Collaborators ───────────────────────────────────────────────────

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn accounts_mut(&mut self) -> &mut D {
        &mut self.accounts
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&BridgeEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }
}
