//! Token ledger collaborator.
//!
//! Operations never touch the ledger directly. They schedule [`LedgerIntent`]s
//! which the dispatcher hands to the [`TokenLedger`] as one batch once the
//! call has otherwise succeeded.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use xchain_types::{AccountName, Asset};

/// A deferred ledger invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LedgerIntent {
    /// Create new supply and credit it to `to`.
    Issue {
        to: AccountName,
        quantity: Asset,
        memo: String,
    },
    Transfer {
        from: AccountName,
        to: AccountName,
        quantity: Asset,
        memo: String,
    },
    /// Destroy `quantity` held by `account`.
    Burn { account: AccountName, quantity: Asset },
}

impl fmt::Display for LedgerIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerIntent::Issue { to, quantity, .. } => write!(f, "issue {quantity} to {to}"),
            LedgerIntent::Transfer {
                from, to, quantity, ..
            } => write!(f, "transfer {quantity} {from} -> {to}"),
            LedgerIntent::Burn { account, quantity } => write!(f, "burn {quantity} from {account}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountName,
        needed: Asset,
        available: Asset,
    },

    #[error("quantity must be positive: {0}")]
    NonPositiveQuantity(Asset),

    #[error("symbol mismatch: ledger holds {expected}, got {actual}")]
    SymbolMismatch { expected: String, actual: String },

    #[error("supply overflow")]
    Overflow,

    #[error("ledger rejected intent: {0}")]
    Rejected(String),
}

/// The external token ledger.
///
/// `execute` must be all-or-nothing: either every intent in the batch takes
/// effect, in order, or none does and an error is returned.
pub trait TokenLedger {
    fn execute(&mut self, intents: &[LedgerIntent]) -> Result<(), LedgerError>;
}
