//! Deposit hooks.
//!
//! A deposit may carry a `hook_msg` that the deployment interprets after the
//! coins are minted, typically to execute a contract call on behalf of the
//! receiver. The hook runs in its own cache: a failure discards the hook's
//! writes but keeps the deposit.

use cosmwasm_std::{Addr, Binary, Coin, Env, Event, StdResult, Storage};

pub trait DepositHook {
    fn on_deposit(
        &self,
        _store: &mut dyn Storage,
        _env: &Env,
        _receiver: &Addr,
        _amount: &Coin,
        _hook_msg: &Binary,
    ) -> StdResult<Vec<Event>> {
        Ok(vec![])
    }
}

/// Hook for deployments that ignore `hook_msg`
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDepositHook;

impl DepositHook for NoopDepositHook {}
