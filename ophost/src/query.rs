//! Query handlers for the host bridge.

use cosmwasm_std::{Binary, Env, Order, StdError, StdResult, Storage};
use cw_storage_plus::Bound;
use opinit_common::{address, l2_denom};

use crate::keeper::{
    is_finalized, last_finalized_output, load_authority, load_params, next_l1_sequence,
    next_output_index,
};
use crate::msg::{
    BatchInfosResponse, BridgeResponse, BridgesResponse, MigrationInfoResponse,
    OraclePriceHashResponse, OutputIndexResponse, OutputProposalResponse,
    OutputProposalsResponse, ParamsResponse, ProvenWithdrawalResponse, SequenceResponse,
    TokenPairResponse, TokenPairsResponse,
};
use crate::state::{
    BridgeConfig, Output, BATCH_INFOS, BRIDGE_CONFIGS, MIGRATION_INFOS, ORACLE_PRICE_HASH,
    OUTPUT_PROPOSALS, PROVEN_WITHDRAWALS, TOKEN_PAIRS,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

fn page_size(limit: Option<u32>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize
}

fn load_config(store: &dyn Storage, bridge_id: u64) -> StdResult<BridgeConfig> {
    BRIDGE_CONFIGS
        .may_load(store, bridge_id)?
        .ok_or_else(|| StdError::not_found(format!("bridge {}", bridge_id)))
}

fn output_response(
    bridge_id: u64,
    output_index: u64,
    output: Output,
    finalized: bool,
) -> OutputProposalResponse {
    OutputProposalResponse {
        bridge_id,
        output_index,
        output_root: Binary::from(output.output_root.to_vec()),
        l1_block_number: output.l1_block_number,
        l1_block_time: output.l1_block_time,
        l2_block_number: output.l2_block_number,
        finalized,
    }
}

// ============================================================================
// Registry Queries
// ============================================================================

pub fn query_params(store: &dyn Storage) -> StdResult<ParamsResponse> {
    Ok(ParamsResponse {
        authority: load_authority(store)?,
        params: load_params(store)?,
    })
}

pub fn query_bridge(store: &dyn Storage, bridge_id: u64) -> StdResult<BridgeResponse> {
    let bridge_config = load_config(store, bridge_id)?;
    let params = load_params(store)?;
    let bridge_addr = address::bridge_address(&params.bech32_prefix, bridge_id)
        .map_err(|e| StdError::generic_err(e.to_string()))?;
    Ok(BridgeResponse {
        bridge_id,
        bridge_addr,
        bridge_config,
    })
}

/// Bridges in ascending id order.
pub fn query_bridges(
    store: &dyn Storage,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<BridgesResponse> {
    let start = start_after.map(Bound::exclusive);
    let bridges = BRIDGE_CONFIGS
        .keys(store, start, None, Order::Ascending)
        .take(page_size(limit))
        .map(|bridge_id| query_bridge(store, bridge_id?))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(BridgesResponse { bridges })
}

// ============================================================================
// Output Queries
// ============================================================================

pub fn query_output_proposal(
    store: &dyn Storage,
    env: &Env,
    bridge_id: u64,
    output_index: u64,
) -> StdResult<OutputProposalResponse> {
    let config = load_config(store, bridge_id)?;
    let output = OUTPUT_PROPOSALS
        .may_load(store, (bridge_id, output_index))?
        .ok_or_else(|| {
            StdError::not_found(format!("output {} of bridge {}", output_index, bridge_id))
        })?;
    let finalized = is_finalized(&config, &output, env.block.time);
    Ok(output_response(bridge_id, output_index, output, finalized))
}

pub fn query_output_proposals(
    store: &dyn Storage,
    env: &Env,
    bridge_id: u64,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<OutputProposalsResponse> {
    let config = load_config(store, bridge_id)?;
    let start = start_after.map(Bound::exclusive);
    let outputs = OUTPUT_PROPOSALS
        .prefix(bridge_id)
        .range(store, start, None, Order::Ascending)
        .take(page_size(limit))
        .map(|item| {
            let (output_index, output) = item?;
            let finalized = is_finalized(&config, &output, env.block.time);
            Ok(output_response(bridge_id, output_index, output, finalized))
        })
        .collect::<StdResult<Vec<_>>>()?;
    Ok(OutputProposalsResponse { outputs })
}

pub fn query_last_finalized_output(
    store: &dyn Storage,
    env: &Env,
    bridge_id: u64,
) -> StdResult<Option<OutputProposalResponse>> {
    let config = load_config(store, bridge_id)?;
    Ok(last_finalized_output(store, bridge_id, &config, env.block.time)?
        .map(|(output_index, output)| output_response(bridge_id, output_index, output, true)))
}

pub fn query_next_l1_sequence(store: &dyn Storage, bridge_id: u64) -> StdResult<SequenceResponse> {
    load_config(store, bridge_id)?;
    Ok(SequenceResponse {
        bridge_id,
        sequence: next_l1_sequence(store, bridge_id)?,
    })
}

pub fn query_next_output_index(
    store: &dyn Storage,
    bridge_id: u64,
) -> StdResult<OutputIndexResponse> {
    load_config(store, bridge_id)?;
    Ok(OutputIndexResponse {
        bridge_id,
        output_index: next_output_index(store, bridge_id)?,
    })
}

// ============================================================================
// Token Queries
// ============================================================================

/// Token pairs are keyed by L2 denom; the L1 lookup recomputes that key.
pub fn query_token_pair_by_l1_denom(
    store: &dyn Storage,
    bridge_id: u64,
    l1_denom: String,
) -> StdResult<TokenPairResponse> {
    query_token_pair_by_l2_denom(store, bridge_id, l2_denom(bridge_id, &l1_denom))
}

pub fn query_token_pair_by_l2_denom(
    store: &dyn Storage,
    bridge_id: u64,
    l2_denom: String,
) -> StdResult<TokenPairResponse> {
    let l1_denom = TOKEN_PAIRS
        .may_load(store, (bridge_id, l2_denom.as_str()))?
        .ok_or_else(|| StdError::not_found(format!("token pair {}", l2_denom)))?;
    Ok(TokenPairResponse { l1_denom, l2_denom })
}

pub fn query_token_pairs(
    store: &dyn Storage,
    bridge_id: u64,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<TokenPairsResponse> {
    let start = start_after.as_deref().map(Bound::exclusive);
    let token_pairs = TOKEN_PAIRS
        .prefix(bridge_id)
        .range(store, start, None, Order::Ascending)
        .take(page_size(limit))
        .map(|item| {
            let (l2_denom, l1_denom) = item?;
            Ok(TokenPairResponse { l1_denom, l2_denom })
        })
        .collect::<StdResult<Vec<_>>>()?;
    Ok(TokenPairsResponse { token_pairs })
}

// ============================================================================
// History & Settlement Queries
// ============================================================================

pub fn query_batch_infos(store: &dyn Storage, bridge_id: u64) -> StdResult<BatchInfosResponse> {
    load_config(store, bridge_id)?;
    let batch_infos = BATCH_INFOS
        .prefix(bridge_id)
        .range(store, None, None, Order::Ascending)
        .map(|item| item.map(|(_, entry)| entry))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(BatchInfosResponse { batch_infos })
}

pub fn query_proven_withdrawal(
    store: &dyn Storage,
    bridge_id: u64,
    withdrawal_hash: Binary,
) -> StdResult<ProvenWithdrawalResponse> {
    Ok(ProvenWithdrawalResponse {
        proven: PROVEN_WITHDRAWALS.has(store, (bridge_id, withdrawal_hash.as_slice())),
    })
}

pub fn query_migration_info(
    store: &dyn Storage,
    bridge_id: u64,
    l1_denom: String,
) -> StdResult<MigrationInfoResponse> {
    let migration_info = MIGRATION_INFOS
        .may_load(store, (bridge_id, l1_denom.as_str()))?
        .ok_or_else(|| StdError::not_found(format!("migration info {}", l1_denom)))?;
    Ok(MigrationInfoResponse { migration_info })
}

pub fn query_oracle_price_hash(store: &dyn Storage) -> StdResult<Option<OraclePriceHashResponse>> {
    Ok(ORACLE_PRICE_HASH
        .may_load(store)?
        .map(|attestation| OraclePriceHashResponse {
            hash: Binary::from(attestation.hash.to_vec()),
            l1_block_height: attestation.l1_block_height,
            l1_block_time_ns: attestation.l1_block_time_ns,
        }))
}
