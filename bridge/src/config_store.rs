//! Owner-only operations on the configuration singleton.

use crate::context::{configuration_mut, CallContext};
use crate::error::BridgeError;
use xchain_store::BridgeState;
use xchain_types::{Configuration, InitParams, IssuanceMode};

pub struct ConfigurationStore;

impl ConfigurationStore {
    /// Create the configuration. Both features start disabled.
    pub fn initialize(
        &self,
        ctx: &CallContext<'_>,
        state: &mut BridgeState,
        params: InitParams,
    ) -> Result<(), BridgeError> {
        ctx.require_owner()?;
        if state.configuration.is_some() {
            return Err(BridgeError::AlreadyInitialized);
        }
        check_quorum(params.quorum_threshold)?;
        tracing::info!(
            ledger = %params.ledger_id,
            quorum = params.quorum_threshold,
            mode = ?params.issuance_mode,
            "initializing bridge configuration"
        );
        state.configuration = Some(Configuration::from_params(params));
        Ok(())
    }

    /// Change the quorum and issuance mode, keeping identity and counter.
    ///
    /// Lowering the quorum does not finalize pending transfers that already
    /// meet it; they finalize on their next accepted attestation.
    pub fn update(
        &self,
        ctx: &CallContext<'_>,
        state: &mut BridgeState,
        quorum_threshold: u64,
        issuance_mode: IssuanceMode,
    ) -> Result<(), BridgeError> {
        ctx.require_owner()?;
        check_quorum(quorum_threshold)?;
        let config = configuration_mut(state)?;
        config.quorum_threshold = quorum_threshold;
        config.issuance_mode = issuance_mode;
        Ok(())
    }

    pub fn set_reporting_enabled(
        &self,
        ctx: &CallContext<'_>,
        state: &mut BridgeState,
        enabled: bool,
    ) -> Result<(), BridgeError> {
        ctx.require_owner()?;
        configuration_mut(state)?.reporting_enabled = enabled;
        Ok(())
    }

    pub fn set_outbound_enabled(
        &self,
        ctx: &CallContext<'_>,
        state: &mut BridgeState,
        enabled: bool,
    ) -> Result<(), BridgeError> {
        ctx.require_owner()?;
        configuration_mut(state)?.outbound_enabled = enabled;
        Ok(())
    }
}

fn check_quorum(quorum_threshold: u64) -> Result<(), BridgeError> {
    if quorum_threshold == 0 {
        return Err(BridgeError::InvalidArgument(
            "quorum threshold must be positive".into(),
        ));
    }
    Ok(())
}
