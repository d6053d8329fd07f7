//! Deposit directives: where an outbound transfer should go.

use crate::error::BridgeError;
use std::str::FromStr;

/// Parsed `"<blockchain>,<account>"` directive carried by a deposit.
///
/// Parsing only splits the fields; the blockchain allow-list and account
/// length are checked by the outbound engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferDirective {
    pub target_blockchain: String,
    pub target_account: String,
}

impl FromStr for TransferDirective {
    type Err = BridgeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(',');
        let (Some(chain), Some(account)) = (parts.next(), parts.next()) else {
            return Err(BridgeError::InvalidDirective(raw.to_string()));
        };
        Ok(Self {
            target_blockchain: chain.trim().to_string(),
            target_account: account.trim().to_string(),
        })
    }
}
