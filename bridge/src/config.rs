//! Deployment configuration with TOML file support.

use crate::call::BridgeCall;
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use xchain_types::{AccountName, IssuanceMode};

/// Settings for running a bridge.
///
/// Can be loaded from a TOML file via [`BridgeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// The bridge's own account: owner of the configuration and holder of
    /// escrowed deposits.
    #[serde(default = "default_bridge_account")]
    pub bridge_account: AccountName,

    /// The token ledger whose asset is bridged.
    #[serde(default = "default_ledger_id")]
    pub ledger_id: AccountName,

    /// Distinct attestations required to finalize an inbound transfer.
    #[serde(default = "default_quorum_threshold")]
    pub quorum_threshold: u64,

    #[serde(default)]
    pub issuance_mode: IssuanceMode,

    /// System accounts whose incoming transfers are never deposits.
    #[serde(default = "default_reserve_accounts")]
    pub reserve_accounts: Vec<AccountName>,

    /// Reporters registered at bootstrap.
    #[serde(default)]
    pub reporters: Vec<AccountName>,

    /// Enable reporting at bootstrap.
    #[serde(default)]
    pub enable_reporting: bool,

    /// Enable outbound transfers at bootstrap.
    #[serde(default)]
    pub enable_outbound: bool,

    /// Accounts the in-memory account directory resolves.
    #[serde(default)]
    pub accounts: Vec<AccountName>,

    /// Snapshot file for the bridge state; in-memory only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_path: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn account(raw: &str) -> AccountName {
    AccountName::new(raw).unwrap_or_else(|e| unreachable!("built-in account name: {e}"))
}

fn default_bridge_account() -> AccountName {
    account("bridge")
}

fn default_ledger_id() -> AccountName {
    account("token")
}

fn default_quorum_threshold() -> u64 {
    1
}

fn default_reserve_accounts() -> Vec<AccountName> {
    ["eosio.ram", "eosio.stake", "eosio.rex"]
        .into_iter()
        .map(account)
        .collect()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::InvalidArgument(format!("config {path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, BridgeError> {
        toml::from_str(s).map_err(|e| BridgeError::InvalidArgument(format!("config: {e}")))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, BridgeError> {
        toml::to_string_pretty(self).map_err(|e| BridgeError::InvalidArgument(e.to_string()))
    }

    /// Owner-signed calls that bring an empty bridge to this configuration.
    pub fn bootstrap_calls(&self) -> Vec<BridgeCall> {
        let mut calls = vec![BridgeCall::Initialize {
            ledger_id: self.ledger_id.clone(),
            quorum_threshold: self.quorum_threshold,
            issuance_mode: self.issuance_mode,
        }];
        calls.extend(
            self.reporters
                .iter()
                .cloned()
                .map(|reporter| BridgeCall::AddReporter { reporter }),
        );
        calls.push(BridgeCall::SetReportingEnabled {
            enabled: self.enable_reporting,
        });
        calls.push(BridgeCall::SetOutboundEnabled {
            enabled: self.enable_outbound,
        });
        calls
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_account: default_bridge_account(),
            ledger_id: default_ledger_id(),
            quorum_threshold: default_quorum_threshold(),
            issuance_mode: IssuanceMode::default(),
            reserve_accounts: default_reserve_accounts(),
            reporters: Vec::new(),
            enable_reporting: false,
            enable_outbound: false,
            accounts: Vec::new(),
            state_path: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
