//! Bridge lifecycle hooks.
//!
//! A deployment wires exactly one [`BridgeHooks`] implementation (for example
//! one that registers IBC channel admins from the bridge metadata). Every
//! method runs inside the message's transaction and its error aborts it.

use cosmwasm_std::{Addr, StdResult, Storage};

use crate::state::{BatchInfo, BridgeConfig};

pub trait BridgeHooks {
    fn bridge_created(
        &self,
        _store: &mut dyn Storage,
        _bridge_id: u64,
        _config: &BridgeConfig,
    ) -> StdResult<()> {
        Ok(())
    }

    fn bridge_proposer_updated(
        &self,
        _store: &mut dyn Storage,
        _bridge_id: u64,
        _proposer: &Addr,
    ) -> StdResult<()> {
        Ok(())
    }

    fn bridge_challenger_updated(
        &self,
        _store: &mut dyn Storage,
        _bridge_id: u64,
        _challenger: &Addr,
    ) -> StdResult<()> {
        Ok(())
    }

    fn bridge_batch_info_updated(
        &self,
        _store: &mut dyn Storage,
        _bridge_id: u64,
        _batch_info: &BatchInfo,
    ) -> StdResult<()> {
        Ok(())
    }

    fn bridge_metadata_updated(
        &self,
        _store: &mut dyn Storage,
        _bridge_id: u64,
        _config: &BridgeConfig,
    ) -> StdResult<()> {
        Ok(())
    }
}

/// Hooks for deployments without lifecycle side effects
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl BridgeHooks for NoopHooks {}
