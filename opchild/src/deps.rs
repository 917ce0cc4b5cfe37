//! Collaborators a child message executes against.

use cosmwasm_std::Storage;
use opinit_common::Bank;

use crate::hooks::DepositHook;

/// Mutable execution context of one message, the child analogue of `DepsMut`.
pub struct ChildDeps<'a> {
    pub storage: &'a mut dyn Storage,
    pub bank: &'a dyn Bank,
    pub deposit_hook: &'a dyn DepositHook,
}

impl<'a> ChildDeps<'a> {
    /// Reborrow the context for one message of a batch.
    pub fn branch(&mut self) -> ChildDeps<'_> {
        ChildDeps {
            storage: &mut *self.storage,
            bank: self.bank,
            deposit_hook: self.deposit_hook,
        }
    }
}
