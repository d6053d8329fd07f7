//! Bridge records, keyed tables and state persistence.
//!
//! Everything the bridge remembers between calls lives in a single
//! [`BridgeState`] value: the configuration singleton, the reporter set and
//! three keyed tables. Storage backends implement [`StateStore`]; the rest of
//! the workspace depends only on the trait.

pub mod error;
pub mod file;
pub mod records;
pub mod state;
pub mod table;

pub use error::StoreError;
pub use file::FileStateStore;
pub use records::{OutboundTransferRecord, PendingInboundTransfer, SettlementCompletionRecord};
pub use state::{BridgeState, CompletionTable, OutboundTable, PendingInboundTable, ReporterSet};
pub use table::KeyedTable;

/// Durable storage for the bridge state.
///
/// `commit` replaces the stored state as a whole; a failed commit must leave
/// the previously committed state in place.
pub trait StateStore {
    /// Load the last committed state, or `None` if nothing was ever committed.
    fn load(&self) -> Result<Option<BridgeState>, StoreError>;

    /// Durably replace the stored state.
    fn commit(&self, state: &BridgeState) -> Result<(), StoreError>;
}
