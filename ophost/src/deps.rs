//! Collaborators a host message executes against.

use cosmwasm_std::Storage;
use opinit_common::ibc::{ChannelKeeper, TransferRouter};
use opinit_common::Bank;

use crate::hooks::BridgeHooks;

/// Mutable execution context of one message, the host analogue of `DepsMut`.
pub struct HostDeps<'a> {
    pub storage: &'a mut dyn Storage,
    pub bank: &'a dyn Bank,
    /// ICS-20 transfer dispatch for migrated denoms
    pub transfer: &'a dyn TransferRouter,
    /// Raw packet sends for attestor-set updates
    pub channels: &'a dyn ChannelKeeper,
    pub hooks: &'a dyn BridgeHooks,
}
