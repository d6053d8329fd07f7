//! Relay: carries outbound transfers from one bridge to another.
//!
//! A relay runs as a single reporter registered on both bridges. Each
//! `OutboundTransferInitiated` event it observes on the source bridge becomes
//! a [`Report`] and moves through this lifecycle:
//!
//! ```text
//! Observed ──attest on target──▶ ReportSuccess ──destroy on source──▶ Finished
//!     │                                 └─────── fails ──▶ ReportSuccessResolveFailed
//!     └── fails ──▶ ReportFailed ──refund on source──▶ ReportFailedRefundSuccess
//!                                 └── fails ──▶ ReportFailedRefundFailed
//! ```
//!
//! Events that cannot be turned into an attestation are parked as
//! `BrokenEvent`. Terminal failure states are left for an operator.

use crate::attestation::Attestation;
use crate::bridge::{Bridge, Receipt};
use crate::call::BridgeCall;
use crate::error::BridgeError;
use crate::event::BridgeEvent;
use crate::host::{AccountDirectory, Authenticator};
use crate::ledger::TokenLedger;
use crate::outbound::ResolveAction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use xchain_store::StateStore;
use xchain_types::{AccountName, Asset, DestinationChain, ExternalTransferId, SequenceId};

/// Longest error text kept on a report.
pub const MAX_LAST_ERROR_LEN: usize = 200;

const ASSERTION_PREFIX: &str = "assertion failure with message: ";

/// Where a report is in the relay lifecycle.
///
/// Ordered: everything before `Finished` still has work to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Nothing sent yet.
    Observed,
    /// Attested on the target; the source record still needs resolving.
    ReportSuccess,
    /// The target rejected the attestation; the deposit needs a refund.
    ReportFailed,
    Finished,
    ReportFailedRefundSuccess,
    ReportFailedRefundFailed,
    ReportSuccessResolveFailed,
    BrokenEvent,
}

impl ReportStatus {
    pub fn is_pending(&self) -> bool {
        *self < ReportStatus::Finished
    }

    /// Terminal states that need an operator.
    pub fn needs_manual_review(&self) -> bool {
        matches!(
            self,
            ReportStatus::ReportFailedRefundFailed
                | ReportStatus::ReportSuccessResolveFailed
                | ReportStatus::BrokenEvent
        )
    }
}

/// The source transaction that carried an outbound deposit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTransaction {
    pub hash: String,
    pub global_sequence: u64,
}

/// One observed outbound transfer and its progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub transaction: SourceTransaction,
    pub sequence_id: SequenceId,
    pub target_blockchain: String,
    pub target_account: String,
    pub quantity: Asset,
    pub status: ReportStatus,
    #[serde(default)]
    pub last_error: String,
}

/// Anything the relay can submit calls to.
pub trait Endpoint {
    fn submit(&mut self, auth: &dyn Authenticator, call: BridgeCall) -> Result<Receipt, BridgeError>;
}

impl<S, L, A> Endpoint for Bridge<S, L, A>
where
    S: StateStore,
    L: TokenLedger,
    A: AccountDirectory,
{
    fn submit(&mut self, auth: &dyn Authenticator, call: BridgeCall) -> Result<Receipt, BridgeError> {
        self.execute(auth, call)
    }
}

/// Signs every call as the relay's reporter account.
struct ReporterKey<'a>(&'a AccountName);

impl Authenticator for ReporterKey<'_> {
    fn has_auth(&self, account: &AccountName) -> bool {
        account == self.0
    }
}

pub struct Relay {
    reporter: AccountName,
    /// Name the target bridge knows the source chain by.
    source_chain: String,
    target_chain: DestinationChain,
    reports: BTreeMap<u64, Report>,
    next_report_id: u64,
}

impl Relay {
    pub fn new(
        reporter: AccountName,
        source_chain: impl Into<String>,
        target_chain: DestinationChain,
    ) -> Self {
        Self {
            reporter,
            source_chain: source_chain.into(),
            target_chain,
            reports: BTreeMap::new(),
            next_report_id: 0,
        }
    }

    pub fn reporter(&self) -> &AccountName {
        &self.reporter
    }

    /// Record an event seen on the source bridge. Returns the report id, or
    /// `None` when the event is not an outbound transfer to this relay's
    /// target chain.
    pub fn observe(&mut self, transaction: SourceTransaction, event: &BridgeEvent) -> Option<u64> {
        let BridgeEvent::OutboundTransferInitiated {
            sequence_id,
            target_blockchain,
            target_account,
            quantity,
        } = event
        else {
            return None;
        };
        let chain = target_blockchain.parse::<DestinationChain>();
        if matches!(chain, Ok(parsed) if parsed != self.target_chain) {
            tracing::debug!(%sequence_id, %target_blockchain, "outbound transfer for another chain");
            return None;
        }

        let mut report = Report {
            transaction,
            sequence_id: *sequence_id,
            target_blockchain: target_blockchain.clone(),
            target_account: target_account.clone(),
            quantity: quantity.clone(),
            status: ReportStatus::Observed,
            last_error: String::new(),
        };
        if let Err(e) = chain.and_then(|_| self.attestation(&report).map(drop)) {
            tracing::warn!(%sequence_id, error = %e, "broken outbound event");
            report.status = ReportStatus::BrokenEvent;
            report.last_error = format_last_error(&e.to_string());
        }

        let id = self.next_report_id;
        self.next_report_id += 1;
        self.reports.insert(id, report);
        Some(id)
    }

    /// Advance the oldest pending report by one call. Returns the report id
    /// and its new status, or `None` when nothing is pending.
    pub fn step(
        &mut self,
        source: &mut dyn Endpoint,
        target: &mut dyn Endpoint,
    ) -> Option<(u64, ReportStatus)> {
        let (&id, report) = self
            .reports
            .iter()
            .find(|(_, report)| report.status.is_pending())?;
        let report = report.clone();
        let key = ReporterKey(&self.reporter);

        let (status, error) = match report.status {
            ReportStatus::Observed => {
                let result = self
                    .attestation(&report)
                    .map_err(|e| BridgeError::InvalidArgument(e.to_string()))
                    .and_then(|a| target.submit(&key, BridgeCall::SubmitAttestation(a)));
                match result {
                    Ok(_) => (ReportStatus::ReportSuccess, None),
                    Err(e) => (ReportStatus::ReportFailed, Some(e)),
                }
            }
            ReportStatus::ReportSuccess => {
                match source.submit(&key, self.resolve(&report, ResolveAction::Destroy, "")) {
                    Ok(_) => (ReportStatus::Finished, None),
                    Err(e) => (ReportStatus::ReportSuccessResolveFailed, Some(e)),
                }
            }
            ReportStatus::ReportFailed => {
                let call = self.resolve(&report, ResolveAction::Refund, &report.last_error);
                match source.submit(&key, call) {
                    Ok(_) => (ReportStatus::ReportFailedRefundSuccess, None),
                    Err(e) => (ReportStatus::ReportFailedRefundFailed, Some(e)),
                }
            }
            _ => return None,
        };

        match &error {
            Some(e) => tracing::warn!(report = id, ?status, error = %e, "relay step failed"),
            None => tracing::info!(report = id, ?status, "relay step committed"),
        }
        let entry = self.reports.get_mut(&id)?;
        entry.status = status;
        entry.last_error = error
            .map(|e| format_last_error(&e.to_string()))
            .unwrap_or_default();
        Some((id, status))
    }

    /// Step until no report is pending. Returns the number of steps taken.
    pub fn run_until_idle(&mut self, source: &mut dyn Endpoint, target: &mut dyn Endpoint) -> usize {
        let mut steps = 0;
        while self.step(source, target).is_some() {
            steps += 1;
        }
        steps
    }

    pub fn report(&self, id: u64) -> Option<&Report> {
        self.reports.get(&id)
    }

    pub fn reports(&self) -> impl Iterator<Item = (u64, &Report)> {
        self.reports.iter().map(|(id, report)| (*id, report))
    }

    pub fn needs_manual_review(&self) -> Vec<u64> {
        self.reports
            .iter()
            .filter(|(_, report)| report.status.needs_manual_review())
            .map(|(id, _)| *id)
            .collect()
    }

    fn attestation(&self, report: &Report) -> Result<Attestation, xchain_types::TypesError> {
        let external_transfer_id =
            ExternalTransferId::derive(&report.transaction.hash, report.sequence_id.raw())?;
        let target_account = AccountName::new(report.target_account.as_str())?;
        let aux_data = serde_json::json!({
            "txId": report.transaction.hash,
            "globalSequence": report.transaction.global_sequence,
        })
        .to_string();
        Ok(Attestation {
            reporter: self.reporter.clone(),
            origin_chain: self.source_chain.clone(),
            external_transfer_id,
            target_account,
            quantity: report.quantity.clone(),
            note: String::new(),
            aux_data,
        })
    }

    fn resolve(&self, report: &Report, action: ResolveAction, reason: &str) -> BridgeCall {
        BridgeCall::Resolve {
            reporter: self.reporter.clone(),
            sequence_id: report.sequence_id,
            action,
            reason: reason.to_string(),
        }
    }
}

/// Strip the host's assertion prefix (any case) and cap the length.
pub fn format_last_error(message: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `message`.
    let lower = message.to_ascii_lowercase();
    let mut stripped = String::with_capacity(message.len());
    let mut rest = 0;
    for (start, _) in lower.match_indices(ASSERTION_PREFIX) {
        stripped.push_str(&message[rest..start]);
        rest = start + ASSERTION_PREFIX.len();
    }
    stripped.push_str(&message[rest..]);
    stripped.chars().take(MAX_LAST_ERROR_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outbound(target_blockchain: &str, target_account: &str) -> BridgeEvent {
        BridgeEvent::OutboundTransferInitiated {
            sequence_id: SequenceId::new(3),
            target_blockchain: target_blockchain.into(),
            target_account: target_account.into(),
            quantity: "1.0000 TKN".parse().unwrap(),
        }
    }

    fn tx(hash: &str) -> SourceTransaction {
        SourceTransaction {
            hash: hash.into(),
            global_sequence: 42,
        }
    }

    fn relay() -> Relay {
        Relay::new(AccountName::new("relay").unwrap(), "wax", DestinationChain::Eos)
    }

    #[test]
    fn prefix_is_stripped_in_any_case() {
        assert_eq!(
            format_last_error("Assertion Failure With Message: reporting is disabled"),
            "reporting is disabled"
        );
        assert_eq!(format_last_error("plain error"), "plain error");
    }

    #[test]
    fn long_errors_are_cut_on_a_char_boundary() {
        let message = "é".repeat(300);
        let formatted = format_last_error(&message);
        assert_eq!(formatted.chars().count(), MAX_LAST_ERROR_LEN);
        assert!(formatted.chars().all(|c| c == 'é'));
    }

    #[test]
    fn statuses_order_pending_before_finished() {
        assert!(ReportStatus::Observed.is_pending());
        assert!(ReportStatus::ReportFailed.is_pending());
        assert!(!ReportStatus::Finished.is_pending());
        assert!(!ReportStatus::BrokenEvent.is_pending());
        assert!(ReportStatus::BrokenEvent.needs_manual_review());
        assert!(!ReportStatus::ReportFailedRefundSuccess.needs_manual_review());
    }

    #[test]
    fn observed_attestation_carries_source_data() {
        let mut relay = relay();
        let id = relay
            .observe(tx("0x00000000000000ffabcd"), &outbound("EOS", "carol"))
            .unwrap();
        let report = relay.report(id).unwrap();
        assert_eq!(report.status, ReportStatus::Observed);

        let attestation = relay.attestation(report).unwrap();
        assert_eq!(attestation.external_transfer_id, ExternalTransferId::new(0xff ^ 3));
        assert_eq!(attestation.origin_chain, "wax");
        assert_eq!(attestation.note, "");
        let aux: serde_json::Value = serde_json::from_str(&attestation.aux_data).unwrap();
        assert_eq!(aux["txId"], "0x00000000000000ffabcd");
        assert_eq!(aux["globalSequence"], 42);
    }

    #[test]
    fn other_chains_and_events_are_ignored() {
        let mut relay = relay();
        assert_eq!(relay.observe(tx("00000000000000ff"), &outbound("wax", "carol")), None);
        let destroyed = BridgeEvent::AssetDestroyed {
            depositor: AccountName::new("bob").unwrap(),
            quantity: "1.0000 TKN".parse().unwrap(),
        };
        assert_eq!(relay.observe(tx("00000000000000ff"), &destroyed), None);
        assert_eq!(relay.reports().count(), 0);
    }

    #[test]
    fn unusable_events_are_parked_as_broken() {
        let mut relay = relay();
        let bad_hash = relay.observe(tx("nothex"), &outbound("eos", "carol")).unwrap();
        let bad_account = relay
            .observe(tx("00000000000000ff"), &outbound("eos", "Not.Valid!"))
            .unwrap();
        let bad_chain = relay
            .observe(tx("00000000000000ff"), &outbound("btc", "carol"))
            .unwrap();
        for id in [bad_hash, bad_account, bad_chain] {
            let report = relay.report(id).unwrap();
            assert_eq!(report.status, ReportStatus::BrokenEvent);
            assert!(!report.last_error.is_empty());
        }
        assert_eq!(relay.needs_manual_review(), vec![bad_hash, bad_account, bad_chain]);
    }
}
