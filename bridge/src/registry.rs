//! Reporter registry.
//!
//! Membership is only consulted when an attestation or resolution is
//! submitted. Removing a reporter leaves its already-counted attestations on
//! pending transfers in place.

use crate::context::{configuration, CallContext};
use crate::error::BridgeError;
use xchain_store::BridgeState;
use xchain_types::AccountName;

pub struct ReporterRegistry;

impl ReporterRegistry {
    pub fn add(
        &self,
        ctx: &CallContext<'_>,
        state: &mut BridgeState,
        reporter: AccountName,
    ) -> Result<(), BridgeError> {
        ctx.require_owner()?;
        configuration(state)?;
        if state.reporters.contains(&reporter) {
            return Err(BridgeError::AlreadyExists(format!("reporter {reporter}")));
        }
        tracing::info!(%reporter, "adding reporter");
        state.reporters.insert(reporter);
        Ok(())
    }

    pub fn remove(
        &self,
        ctx: &CallContext<'_>,
        state: &mut BridgeState,
        reporter: &AccountName,
    ) -> Result<(), BridgeError> {
        ctx.require_owner()?;
        configuration(state)?;
        if !state.reporters.remove(reporter) {
            return Err(BridgeError::NotFound(format!("reporter {reporter}")));
        }
        tracing::info!(%reporter, "removed reporter");
        Ok(())
    }

    pub fn is_member(&self, state: &BridgeState, reporter: &AccountName) -> bool {
        state.reporters.contains(reporter)
    }

    /// Members in sorted order.
    pub fn list<'s>(&self, state: &'s BridgeState) -> impl Iterator<Item = &'s AccountName> {
        state.reporters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{name, Accounts, Signers};
    use xchain_types::{Configuration, InitParams, IssuanceMode};

    fn initialized() -> BridgeState {
        let mut state = BridgeState::new();
        state.configuration = Some(Configuration::from_params(InitParams {
            ledger_id: name("token"),
            quorum_threshold: 1,
            issuance_mode: IssuanceMode::MintThenTransfer,
        }));
        state
    }

    #[test]
    fn add_then_remove() {
        let (auth, accounts, me) = (Signers::of(&["bridge"]), Accounts::all(), name("bridge"));
        let ctx = CallContext::new(&auth, &accounts, &me);
        let mut state = initialized();

        ReporterRegistry.add(&ctx, &mut state, name("rep2")).unwrap();
        ReporterRegistry.add(&ctx, &mut state, name("rep1")).unwrap();
        assert!(ReporterRegistry.is_member(&state, &name("rep1")));
        let listed: Vec<_> = ReporterRegistry.list(&state).cloned().collect();
        assert_eq!(listed, vec![name("rep1"), name("rep2")]);

        ReporterRegistry.remove(&ctx, &mut state, &name("rep1")).unwrap();
        assert!(!ReporterRegistry.is_member(&state, &name("rep1")));
    }

    #[test]
    fn duplicate_add_and_missing_remove_fail() {
        let (auth, accounts, me) = (Signers::of(&["bridge"]), Accounts::all(), name("bridge"));
        let ctx = CallContext::new(&auth, &accounts, &me);
        let mut state = initialized();

        ReporterRegistry.add(&ctx, &mut state, name("rep1")).unwrap();
        assert!(matches!(
            ReporterRegistry.add(&ctx, &mut state, name("rep1")),
            Err(BridgeError::AlreadyExists(_))
        ));
        assert!(matches!(
            ReporterRegistry.remove(&ctx, &mut state, &name("nobody")),
            Err(BridgeError::NotFound(_))
        ));
    }

    #[test]
    fn non_owner_cannot_modify() {
        let (auth, accounts, me) = (Signers::of(&["rep1"]), Accounts::all(), name("bridge"));
        let ctx = CallContext::new(&auth, &accounts, &me);
        let mut state = initialized();
        assert!(matches!(
            ReporterRegistry.add(&ctx, &mut state, name("rep1")),
            Err(BridgeError::Unauthenticated(_))
        ));
        assert!(state.reporters.is_empty());
    }

    #[test]
    fn uninitialized_bridge_has_no_registry() {
        let (auth, accounts, me) = (Signers::of(&["bridge"]), Accounts::all(), name("bridge"));
        let ctx = CallContext::new(&auth, &accounts, &me);
        let mut state = BridgeState::new();
        assert!(matches!(
            ReporterRegistry.add(&ctx, &mut state, name("rep1")),
            Err(BridgeError::NotInitialized)
        ));
    }
}
