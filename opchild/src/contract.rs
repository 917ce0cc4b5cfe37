//! OPinit Child Bridge - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - execute message handlers
//! - `query` - query message handlers
//! - `validators` - the end-block validator diff
//! - `middleware` - conversion of migrated IBC vouchers
//!
//! Every message runs inside a [`CacheStore`]; its writes reach the
//! underlying store only when the handler succeeds.

use cosmwasm_std::{to_json_binary, Binary, Env, MessageInfo, Response, StdResult, Storage};
use cw2::set_contract_version;
use opinit_common::{address, CacheStore};
use tracing::debug;

use crate::deps::ChildDeps;
use crate::error::ChildError;
use crate::execute::{
    execute_add_validator, execute_deposit, execute_messages, execute_register_migration_info,
    execute_remove_validator, execute_set_bridge_info, execute_update_params, execute_withdraw,
};
use crate::keeper::validate_params;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::query::{
    query_bridge_info, query_denom_pair, query_finalized_l1_sequence, query_migration_info,
    query_next_l2_sequence, query_params, query_validator, query_validators,
};
use crate::state::{AUTHORITY, CONTRACT_NAME, CONTRACT_VERSION, INITIAL_SEQUENCE, NEXT_L2_SEQUENCE, PARAMS};
use crate::validators::EndBlock;

// ============================================================================
// Instantiate
// ============================================================================

pub fn instantiate(
    storage: &mut dyn Storage,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ChildError> {
    set_contract_version(storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let params = validate_params(storage, &msg.params)?;
    let authority = address::validate(&params.bech32_prefix, &msg.authority)?;

    AUTHORITY.save(storage, &authority)?;
    PARAMS.save(storage, &params)?;
    NEXT_L2_SEQUENCE.save(storage, &INITIAL_SEQUENCE)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("authority", authority)
        .add_attribute("admin", params.admin)
        .add_attribute("bech32_prefix", params.bech32_prefix))
}

// ============================================================================
// Execute
// ============================================================================

/// Apply one message atomically.
pub fn execute(
    deps: ChildDeps,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ChildError> {
    let ChildDeps {
        storage,
        bank,
        deposit_hook,
    } = deps;

    let mut cache = CacheStore::new(storage);
    let res = dispatch(
        ChildDeps {
            storage: &mut cache,
            bank,
            deposit_hook,
        },
        env,
        info,
        msg,
    );
    match &res {
        Ok(_) => cache.commit(),
        Err(err) => debug!(error = %err, "message reverted"),
    }
    res
}

pub(crate) fn dispatch(
    deps: ChildDeps,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ChildError> {
    match msg {
        // Authority
        ExecuteMsg::ExecuteMessages { messages } => execute_messages(deps, env, info, messages),
        ExecuteMsg::AddValidator {
            moniker,
            operator_address,
            consensus_pubkey,
        } => execute_add_validator(deps, env, info, moniker, operator_address, consensus_pubkey),
        ExecuteMsg::RemoveValidator { operator_address } => {
            execute_remove_validator(deps, env, info, operator_address)
        }
        ExecuteMsg::UpdateParams { params } => execute_update_params(deps, env, info, params),
        ExecuteMsg::RegisterMigrationInfo { migration_info } => {
            execute_register_migration_info(deps, env, info, migration_info)
        }

        // Bridge
        ExecuteMsg::SetBridgeInfo { bridge_info } => {
            execute_set_bridge_info(deps, env, info, bridge_info)
        }
        ExecuteMsg::Deposit(deposit) => execute_deposit(deps, env, info, deposit),
        ExecuteMsg::Withdraw { to, amount } => execute_withdraw(deps, env, info, to, amount),
    }
}

// ============================================================================
// Block Hooks
// ============================================================================

/// Hand the validator diff of this block to consensus.
pub fn end_block(storage: &mut dyn Storage, _env: Env) -> Result<EndBlock, ChildError> {
    crate::validators::end_block(storage)
}

// ============================================================================
// Query
// ============================================================================

pub fn query(storage: &dyn Storage, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Params {} => to_json_binary(&query_params(storage)?),
        QueryMsg::BridgeInfo {} => to_json_binary(&query_bridge_info(storage)?),
        QueryMsg::Validator { operator_address } => {
            to_json_binary(&query_validator(storage, operator_address)?)
        }
        QueryMsg::Validators { start_after, limit } => {
            to_json_binary(&query_validators(storage, start_after, limit)?)
        }
        QueryMsg::NextL2Sequence {} => to_json_binary(&query_next_l2_sequence(storage)?),
        QueryMsg::FinalizedL1Sequence { sequence } => {
            to_json_binary(&query_finalized_l1_sequence(storage, sequence)?)
        }
        QueryMsg::DenomPair { denom } => to_json_binary(&query_denom_pair(storage, denom)?),
        QueryMsg::MigrationInfo { denom } => {
            to_json_binary(&query_migration_info(storage, denom)?)
        }
    }
}
