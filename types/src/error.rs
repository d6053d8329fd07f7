//! Parse and validation errors for the value types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid account name \"{0}\"")]
    InvalidAccountName(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("invalid asset \"{0}\"")]
    InvalidAsset(String),

    #[error("asset amount out of range")]
    AmountOutOfRange,

    #[error("chain \"{0}\" is not a supported destination")]
    UnsupportedChain(String),

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),
}
