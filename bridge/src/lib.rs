//! Cross-chain bridge core.
//!
//! Two independent flows share one state:
//!
//! - **Inbound**: registered reporters attest to transfers that happened on a
//!   remote chain. Once `quorum_threshold` distinct reporters agree on the
//!   same data, the funds are released on the local token ledger, exactly once.
//! - **Outbound**: deposits to the bridge account are held as numbered
//!   outbound transfers until a single reporter refunds or destroys them.
//!
//! Collaborators (authentication, account lookup, the token ledger, state
//! storage) sit behind traits. [`Bridge`] runs each call atomically against them.
//! A [`Relay`] links two bridges by reporting one side's outbound transfers
//! to the other.

pub mod attestation;
pub mod bridge;
pub mod call;
pub mod config;
pub mod config_store;
pub mod context;
pub mod directive;
pub mod error;
pub mod event;
pub mod host;
pub mod ledger;
pub mod outbound;
pub mod registry;
pub mod relay;

#[cfg(test)]
mod testkit;

pub use attestation::{Attestation, AttestationEngine, AttestationOutcome, MAX_NOTE_LEN};
pub use bridge::{Bridge, Receipt};
pub use call::BridgeCall;
pub use config::BridgeConfig;
pub use config_store::ConfigurationStore;
pub use context::{CallContext, Effects};
pub use directive::TransferDirective;
pub use error::{BridgeError, Feature};
pub use event::{BridgeEvent, EventBus};
pub use host::{AccountDirectory, Authenticator};
pub use ledger::{LedgerError, LedgerIntent, TokenLedger};
pub use outbound::{DepositNotification, OutboundEngine, ResolveAction};
pub use registry::ReporterRegistry;
pub use relay::{Endpoint, Relay, Report, ReportStatus, SourceTransaction};
