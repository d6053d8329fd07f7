//! Nullable infrastructure for deterministic testing.
//!
//! Every host collaborator the bridge talks to (authentication, account
//! lookup, the token ledger, state storage) is abstracted behind a trait.
//! This crate provides test-friendly implementations that:
//! - Keep all state in memory
//! - Can be controlled programmatically, including injected failures
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests and local replays.

pub mod accounts;
pub mod auth;
pub mod ledger;
pub mod store;

pub use accounts::NullAccounts;
pub use auth::NullAuth;
pub use ledger::NullLedger;
pub use store::NullStateStore;
