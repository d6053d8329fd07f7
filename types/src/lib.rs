//! Fundamental types for the xchain bridge.
//!
//! This crate defines the value types shared across every other crate in the workspace:
//! ledger account names, assets, transfer identifiers, destination chains and the
//! bridge configuration record.

pub mod account;
pub mod asset;
pub mod chain;
pub mod error;
pub mod ids;
pub mod params;

pub use account::AccountName;
pub use asset::{Asset, Symbol};
pub use chain::DestinationChain;
pub use error::TypesError;
pub use ids::{ExternalTransferId, SequenceId};
pub use params::{Configuration, InitParams, IssuanceMode};
