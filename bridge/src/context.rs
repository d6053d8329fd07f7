//! Per-call execution context.

use crate::error::BridgeError;
use crate::event::BridgeEvent;
use crate::host::{AccountDirectory, Authenticator};
use crate::ledger::LedgerIntent;
use xchain_store::BridgeState;
use xchain_types::{AccountName, Configuration};

/// Ledger intents and events produced by one call, applied only if it commits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    pub intents: Vec<LedgerIntent>,
    pub events: Vec<BridgeEvent>,
}

/// What an operation may consult and schedule while it runs.
pub struct CallContext<'a> {
    auth: &'a dyn Authenticator,
    accounts: &'a dyn AccountDirectory,
    bridge_account: &'a AccountName,
    effects: Effects,
}

impl<'a> CallContext<'a> {
    pub fn new(
        auth: &'a dyn Authenticator,
        accounts: &'a dyn AccountDirectory,
        bridge_account: &'a AccountName,
    ) -> Self {
        Self {
            auth,
            accounts,
            bridge_account,
            effects: Effects::default(),
        }
    }

    /// The bridge's own account; it owns the configuration and holds escrowed funds.
    pub fn bridge_account(&self) -> &AccountName {
        self.bridge_account
    }

    pub fn has_auth(&self, account: &AccountName) -> bool {
        self.auth.has_auth(account)
    }

    pub fn require_auth(&self, account: &AccountName) -> Result<(), BridgeError> {
        if self.auth.has_auth(account) {
            Ok(())
        } else {
            Err(BridgeError::Unauthenticated(account.to_string()))
        }
    }

    pub fn require_owner(&self) -> Result<(), BridgeError> {
        self.require_auth(self.bridge_account)
    }

    pub fn account_exists(&self, account: &AccountName) -> bool {
        self.accounts.exists(account)
    }

    pub fn schedule(&mut self, intent: LedgerIntent) {
        self.effects.intents.push(intent);
    }

    pub fn emit(&mut self, event: BridgeEvent) {
        self.effects.events.push(event);
    }

    pub fn into_effects(self) -> Effects {
        self.effects
    }
}

/// The configuration, or `NotInitialized`.
pub fn configuration(state: &BridgeState) -> Result<&Configuration, BridgeError> {
    state
        .configuration
        .as_ref()
        .ok_or(BridgeError::NotInitialized)
}

pub fn configuration_mut(state: &mut BridgeState) -> Result<&mut Configuration, BridgeError> {
    state
        .configuration
        .as_mut()
        .ok_or(BridgeError::NotInitialized)
}
