//! OPinit Host Bridge - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - execute message handlers
//! - `query` - query message handlers
//! - `oracle` - the begin-block oracle commitment
//!
//! Every message runs inside a [`CacheStore`]; its writes reach the
//! underlying store only when the handler succeeds.

use cosmwasm_std::{to_json_binary, Binary, Env, MessageInfo, Response, StdResult, Storage};
use cw2::set_contract_version;
use opinit_common::{address, CacheStore};
use tracing::debug;

use crate::deps::HostDeps;
use crate::error::HostError;
use crate::execute::{
    execute_create_bridge, execute_delete_output, execute_finalize_token_withdrawal,
    execute_initiate_token_deposit, execute_propose_output, execute_record_batch,
    execute_register_migration_info, execute_update_attestor_set, execute_update_batch_info,
    execute_update_challenger, execute_update_metadata, execute_update_oracle_config,
    execute_update_params, execute_update_proposer, validate_params,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::oracle::{update_oracle_price_hash, OracleProvider};
use crate::query::{
    query_batch_infos, query_bridge, query_bridges, query_last_finalized_output,
    query_migration_info, query_next_l1_sequence, query_next_output_index,
    query_oracle_price_hash, query_output_proposal, query_output_proposals, query_params,
    query_proven_withdrawal, query_token_pair_by_l1_denom, query_token_pair_by_l2_denom,
    query_token_pairs,
};
use crate::state::{AUTHORITY, CONTRACT_NAME, CONTRACT_VERSION, INITIAL_SEQUENCE, NEXT_BRIDGE_ID, PARAMS};

// ============================================================================
// Instantiate
// ============================================================================

pub fn instantiate(
    storage: &mut dyn Storage,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, HostError> {
    set_contract_version(storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let params = msg.params.unwrap_or_default();
    validate_params(&params)?;
    let authority = address::validate(&params.bech32_prefix, &msg.authority)?;

    AUTHORITY.save(storage, &authority)?;
    PARAMS.save(storage, &params)?;
    NEXT_BRIDGE_ID.save(storage, &INITIAL_SEQUENCE)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("authority", authority)
        .add_attribute("bech32_prefix", params.bech32_prefix))
}

// ============================================================================
// Execute
// ============================================================================

/// Apply one message atomically.
pub fn execute(
    deps: HostDeps,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, HostError> {
    let HostDeps {
        storage,
        bank,
        transfer,
        channels,
        hooks,
    } = deps;

    let mut cache = CacheStore::new(storage);
    let res = dispatch(
        HostDeps {
            storage: &mut cache,
            bank,
            transfer,
            channels,
            hooks,
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

fn dispatch(
    deps: HostDeps,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, HostError> {
    match msg {
        // Bridge registry
        ExecuteMsg::CreateBridge { config } => execute_create_bridge(deps, env, info, config),
        ExecuteMsg::UpdateProposer {
            bridge_id,
            new_proposer,
        } => execute_update_proposer(deps, env, info, bridge_id, new_proposer),
        ExecuteMsg::UpdateChallenger {
            bridge_id,
            new_challenger,
        } => execute_update_challenger(deps, env, info, bridge_id, new_challenger),
        ExecuteMsg::UpdateBatchInfo {
            bridge_id,
            new_batch_info,
        } => execute_update_batch_info(deps, env, info, bridge_id, new_batch_info),
        ExecuteMsg::UpdateMetadata {
            bridge_id,
            metadata,
        } => execute_update_metadata(deps, env, info, bridge_id, metadata),
        ExecuteMsg::UpdateOracleConfig {
            bridge_id,
            oracle_enabled,
        } => execute_update_oracle_config(deps, env, info, bridge_id, oracle_enabled),
        ExecuteMsg::UpdateAttestorSet {
            bridge_id,
            attestor_set,
        } => execute_update_attestor_set(deps, env, info, bridge_id, attestor_set),

        // Output ledger
        ExecuteMsg::RecordBatch {
            bridge_id,
            batch_bytes,
        } => execute_record_batch(deps, env, info, bridge_id, batch_bytes),
        ExecuteMsg::ProposeOutput {
            bridge_id,
            output_index,
            l2_block_number,
            output_root,
        } => execute_propose_output(
            deps,
            env,
            info,
            bridge_id,
            output_index,
            l2_block_number,
            output_root,
        ),
        ExecuteMsg::DeleteOutput {
            bridge_id,
            output_index,
        } => execute_delete_output(deps, env, info, bridge_id, output_index),

        // Token flow
        ExecuteMsg::InitiateTokenDeposit {
            bridge_id,
            to,
            amount,
            data,
        } => execute_initiate_token_deposit(deps, env, info, bridge_id, to, amount, data),
        ExecuteMsg::FinalizeTokenWithdrawal(withdrawal) => {
            execute_finalize_token_withdrawal(deps, env, info, withdrawal)
        }

        // Governance
        ExecuteMsg::UpdateParams { params } => execute_update_params(deps, env, info, params),
        ExecuteMsg::RegisterMigrationInfo {
            bridge_id,
            migration_info,
        } => execute_register_migration_info(deps, env, info, bridge_id, migration_info),
    }
}

// ============================================================================
// Block Hooks
// ============================================================================

/// Refresh the oracle-price commitment before any message of the block.
pub fn begin_block(
    storage: &mut dyn Storage,
    env: Env,
    oracle: Option<&dyn OracleProvider>,
) -> Result<Response, HostError> {
    let mut cache = CacheStore::new(storage);
    let res = update_oracle_price_hash(&mut cache, &env, oracle)?;
    cache.commit();
    Ok(res)
}

// ============================================================================
// Query
// ============================================================================

pub fn query(storage: &dyn Storage, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Params {} => to_json_binary(&query_params(storage)?),
        QueryMsg::Bridge { bridge_id } => to_json_binary(&query_bridge(storage, bridge_id)?),
        QueryMsg::Bridges { start_after, limit } => {
            to_json_binary(&query_bridges(storage, start_after, limit)?)
        }
        QueryMsg::OutputProposal {
            bridge_id,
            output_index,
        } => to_json_binary(&query_output_proposal(
            storage,
            &env,
            bridge_id,
            output_index,
        )?),
        QueryMsg::OutputProposals {
            bridge_id,
            start_after,
            limit,
        } => to_json_binary(&query_output_proposals(
            storage,
            &env,
            bridge_id,
            start_after,
            limit,
        )?),
        QueryMsg::LastFinalizedOutput { bridge_id } => {
            to_json_binary(&query_last_finalized_output(storage, &env, bridge_id)?)
        }
        QueryMsg::NextL1Sequence { bridge_id } => {
            to_json_binary(&query_next_l1_sequence(storage, bridge_id)?)
        }
        QueryMsg::NextOutputIndex { bridge_id } => {
            to_json_binary(&query_next_output_index(storage, bridge_id)?)
        }
        QueryMsg::TokenPairByL1Denom {
            bridge_id,
            l1_denom,
        } => to_json_binary(&query_token_pair_by_l1_denom(storage, bridge_id, l1_denom)?),
        QueryMsg::TokenPairByL2Denom {
            bridge_id,
            l2_denom,
        } => to_json_binary(&query_token_pair_by_l2_denom(storage, bridge_id, l2_denom)?),
        QueryMsg::TokenPairs {
            bridge_id,
            start_after,
            limit,
        } => to_json_binary(&query_token_pairs(storage, bridge_id, start_after, limit)?),
        QueryMsg::BatchInfos { bridge_id } => {
            to_json_binary(&query_batch_infos(storage, bridge_id)?)
        }
        QueryMsg::ProvenWithdrawal {
            bridge_id,
            withdrawal_hash,
        } => to_json_binary(&query_proven_withdrawal(
            storage,
            bridge_id,
            withdrawal_hash,
        )?),
        QueryMsg::MigrationInfo {
            bridge_id,
            l1_denom,
        } => to_json_binary(&query_migration_info(storage, bridge_id, l1_denom)?),
        QueryMsg::OraclePriceHash {} => to_json_binary(&query_oracle_price_hash(storage)?),
    }
}
