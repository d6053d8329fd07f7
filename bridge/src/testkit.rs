//! Minimal host doubles for unit tests inside this crate.

use crate::host::{AccountDirectory, Authenticator};
use std::collections::HashSet;
use xchain_store::BridgeState;
use xchain_types::{AccountName, Asset, Configuration, InitParams, IssuanceMode};

pub fn name(s: &str) -> AccountName {
    AccountName::new(s).unwrap()
}

pub fn tkn(s: &str) -> Asset {
    format!("{s} TKN").parse().unwrap()
}

pub struct Signers(pub HashSet<AccountName>);

impl Signers {
    pub fn of(names: &[&str]) -> Self {
        Self(names.iter().map(|n| name(n)).collect())
    }
}

impl Authenticator for Signers {
    fn has_auth(&self, account: &AccountName) -> bool {
        self.0.contains(account)
    }
}

/// Resolves every account except those listed as missing.
pub struct Accounts {
    pub missing: HashSet<AccountName>,
}

impl Accounts {
    pub fn all() -> Self {
        Self {
            missing: HashSet::new(),
        }
    }
}

impl AccountDirectory for Accounts {
    fn exists(&self, account: &AccountName) -> bool {
        !self.missing.contains(account)
    }
}

/// Initialized state with reporters `rep1..rep3` and both features enabled.
pub fn ready_state(quorum_threshold: u64, issuance_mode: IssuanceMode) -> BridgeState {
    let mut config = Configuration::from_params(InitParams {
        ledger_id: name("token"),
        quorum_threshold,
        issuance_mode,
    });
    config.reporting_enabled = true;
    config.outbound_enabled = true;

    let mut state = BridgeState::new();
    state.configuration = Some(config);
    for r in ["rep1", "rep2", "rep3"] {
        state.reporters.insert(name(r));
    }
    state
}
