//! Script replay against in-memory collaborators.
//!
//! A script is a JSON array of steps. Each step either funds an account on
//! the in-memory ledger or executes one bridge call under a set of signers:
//!
//! ```json
//! [
//!   { "credit": { "account": "bob", "quantity": "5.0000 TKN" } },
//!   { "signers": ["rep1"], "call": { "op": "submit_attestation", "...": "..." } }
//! ]
//! ```
//!
//! When `state_path` is set, the in-memory ledger is saved next to the state
//! as `<state_path>.ledger` (JSON) after every step, so escrowed balances
//! survive between runs.
//!
//! A `deposit_notification` call first moves the tokens from the depositor
//! to the bridge on the ledger and moves them back if the bridge rejects the
//! notification, the way a reverted transfer would.

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use xchain_bridge::{
    Bridge, BridgeCall, BridgeConfig, BridgeError, LedgerIntent, Receipt, TokenLedger,
};
use xchain_nullables::{NullAccounts, NullAuth, NullLedger, NullStateStore};
use xchain_store::{BridgeState, FileStateStore, StateStore, StoreError};
use xchain_types::{AccountName, Asset};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Call {
        #[serde(default)]
        signers: Vec<AccountName>,
        call: BridgeCall,
    },
    Credit {
        credit: Credit,
    },
}

#[derive(Debug, Deserialize)]
pub struct Credit {
    pub account: AccountName,
    pub quantity: Asset,
}

pub fn parse_script(raw: &str) -> anyhow::Result<Vec<Step>> {
    serde_json::from_str(raw).context("parsing script")
}

/// File-backed when `state_path` is configured, in memory otherwise.
pub enum ReplayStore {
    File(FileStateStore),
    Memory(NullStateStore),
}

impl StateStore for ReplayStore {
    fn load(&self) -> Result<Option<BridgeState>, StoreError> {
        match self {
            ReplayStore::File(store) => store.load(),
            ReplayStore::Memory(store) => store.load(),
        }
    }

    fn commit(&self, state: &BridgeState) -> Result<(), StoreError> {
        match self {
            ReplayStore::File(store) => store.commit(state),
            ReplayStore::Memory(store) => store.commit(state),
        }
    }
}

pub type ReplayBridge = Bridge<ReplayStore, NullLedger, NullAccounts>;

/// Open the bridge described by `config`, bootstrapping it if the state is empty.
pub fn open(config: &BridgeConfig) -> anyhow::Result<ReplayBridge> {
    let store = match &config.state_path {
        Some(path) => ReplayStore::File(FileStateStore::new(path)),
        None => ReplayStore::Memory(NullStateStore::new()),
    };
    let accounts = if config.accounts.is_empty() {
        NullAccounts::permissive()
    } else {
        NullAccounts::new(config.accounts.iter().cloned())
    };

    let ledger = match ledger_path(config) {
        Some(path) => load_ledger(&path)?,
        None => NullLedger::new(),
    };

    let mut bridge = Bridge::open(
        config.bridge_account.clone(),
        config.reserve_accounts.iter().cloned(),
        store,
        ledger,
        accounts,
    )?;

    if bridge.configuration().is_none() {
        let owner = NullAuth::signed_by([config.bridge_account.clone()]);
        for call in config.bootstrap_calls() {
            let op = call.name();
            bridge
                .execute(&owner, call)
                .with_context(|| format!("bootstrap {op}"))?;
        }
        tracing::info!(account = %config.bridge_account, "bridge bootstrapped");
    }
    Ok(bridge)
}

/// Where the ledger snapshot lives, if state is persisted at all.
pub fn ledger_path(config: &BridgeConfig) -> Option<PathBuf> {
    config.state_path.as_ref().map(|state| {
        let mut path = state.clone().into_os_string();
        path.push(".ledger");
        PathBuf::from(path)
    })
}

fn load_ledger(path: &Path) -> anyhow::Result<NullLedger> {
    if !path.exists() {
        return Ok(NullLedger::new());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn save_ledger(path: &Path, ledger: &NullLedger) -> anyhow::Result<()> {
    let mut temp = path.as_os_str().to_os_string();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);
    fs::write(&temp, serde_json::to_vec(ledger)?)?;
    fs::rename(&temp, path).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub committed: usize,
    pub rejected: usize,
}

/// Run every step, writing one JSON line per step to `out`.
///
/// A rejected call is reported and the replay continues.
pub fn run(
    config: &BridgeConfig,
    steps: Vec<Step>,
    out: &mut impl Write,
) -> anyhow::Result<Summary> {
    let mut bridge = open(config)?;
    let ledger_path = ledger_path(config);
    let mut summary = Summary::default();

    for (index, step) in steps.into_iter().enumerate() {
        let line = match step {
            Step::Credit { credit } => {
                match bridge.ledger_mut().credit(&credit.account, &credit.quantity) {
                    Ok(()) => {
                        summary.committed += 1;
                        json!({ "step": index, "op": "credit", "ok": true })
                    }
                    Err(e) => {
                        summary.rejected += 1;
                        json!({ "step": index, "op": "credit", "ok": false, "error": e.to_string() })
                    }
                }
            }
            Step::Call { signers, call } => {
                let op = call.name();
                let auth = NullAuth::signed_by(signers);
                match execute(&mut bridge, &auth, call) {
                    Ok(receipt) => {
                        summary.committed += 1;
                        json!({
                            "step": index,
                            "op": op,
                            "ok": true,
                            "events": receipt.events,
                            "intents": receipt.intents,
                        })
                    }
                    Err(e) => {
                        summary.rejected += 1;
                        json!({ "step": index, "op": op, "ok": false, "error": e.to_string() })
                    }
                }
            }
        };
        if let Some(path) = &ledger_path {
            save_ledger(path, bridge.ledger())?;
        }
        writeln!(out, "{line}")?;
    }
    Ok(summary)
}

fn execute(
    bridge: &mut ReplayBridge,
    auth: &NullAuth,
    call: BridgeCall,
) -> Result<Receipt, BridgeError> {
    let BridgeCall::DepositNotification(deposit) = &call else {
        return bridge.execute(auth, call);
    };

    let transfer = LedgerIntent::Transfer {
        from: deposit.from.clone(),
        to: deposit.to.clone(),
        quantity: deposit.quantity.clone(),
        memo: deposit.directive.clone(),
    };
    let reverse = LedgerIntent::Transfer {
        from: deposit.to.clone(),
        to: deposit.from.clone(),
        quantity: deposit.quantity.clone(),
        memo: "reverted".to_string(),
    };
    bridge.ledger_mut().execute(&[transfer])?;
    let result = bridge.execute(auth, call);
    if result.is_err() {
        if let Err(e) = bridge.ledger_mut().execute(&[reverse]) {
            tracing::error!(error = %e, "failed to revert deposit transfer");
        }
    }
    result
}
