//! Errors returned by bridge calls.

use std::fmt;
use thiserror::Error;
use xchain_store::StoreError;
use xchain_types::{AccountName, ExternalTransferId};

use crate::ledger::LedgerError;

/// Feature switches kept in the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Reporting,
    Outbound,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Reporting => f.write_str("reporting"),
            Feature::Outbound => f.write_str("outbound transfers"),
        }
    }
}

/// Every way a bridge call can be rejected.
///
/// All variants are terminal for the call: nothing the call did is kept.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("missing required authority of {0}")]
    Unauthenticated(String),

    #[error("bridge is already initialized")]
    AlreadyInitialized,

    #[error("bridge is not initialized")]
    NotInitialized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} is disabled")]
    FeatureDisabled(Feature),

    #[error("{0} is not a known reporter")]
    UnknownReporter(AccountName),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid target account \"{0}\"")]
    InvalidTarget(String),

    #[error("reporter {reporter} already attested transfer {id}")]
    DuplicateAttestation {
        reporter: AccountName,
        id: ExternalTransferId,
    },

    #[error("attestation for transfer {0} does not match the pending record")]
    ConflictingData(ExternalTransferId),

    #[error("deposit notified by ledger {actual}, expected {expected}")]
    UnexpectedAsset {
        expected: AccountName,
        actual: AccountName,
    },

    #[error("invalid transfer directive \"{0}\"")]
    InvalidDirective(String),

    #[error("target blockchain \"{0}\" is not supported")]
    UnsupportedChain(String),

    #[error("transfer {0} was already settled")]
    DuplicateSettlement(ExternalTransferId),

    #[error("ledger rejected the call's intents: {0}")]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("stored state was written ahead of a ledger batch that was never confirmed; reconcile it with the ledger before reopening")]
    UnconfirmedSnapshot,
}
