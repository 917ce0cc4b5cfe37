//! Query handlers for the child bridge.

use cosmwasm_std::{Addr, Order, StdError, StdResult, Storage};
use cw_storage_plus::Bound;
use opinit_common::ibc::{ibc_denom, prefixed_denom};

use crate::keeper::{has_finalized_l1_sequence, load_authority, load_params, peek_l2_sequence};
use crate::msg::{
    BridgeInfoResponse, DenomPairResponse, FinalizedSequenceResponse, MigrationInfoResponse,
    ParamsResponse, SequenceResponse, ValidatorResponse, ValidatorsResponse,
};
use crate::state::{DenomPair, BRIDGE_INFO, DENOM_PAIRS, MIGRATION_INFOS, VALIDATORS};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

pub fn query_params(store: &dyn Storage) -> StdResult<ParamsResponse> {
    Ok(ParamsResponse {
        authority: load_authority(store)?,
        params: load_params(store)?,
    })
}

pub fn query_bridge_info(store: &dyn Storage) -> StdResult<BridgeInfoResponse> {
    let bridge_info = BRIDGE_INFO
        .may_load(store)?
        .ok_or_else(|| StdError::not_found("bridge info"))?;
    Ok(BridgeInfoResponse { bridge_info })
}

pub fn query_validator(store: &dyn Storage, operator_address: String) -> StdResult<ValidatorResponse> {
    let operator = Addr::unchecked(operator_address);
    let validator = VALIDATORS
        .may_load(store, &operator)?
        .ok_or_else(|| StdError::not_found(format!("validator {}", operator)))?;
    Ok(ValidatorResponse { validator })
}

/// Validators in operator address order, including those pending removal.
pub fn query_validators(
    store: &dyn Storage,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<ValidatorsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start_addr = start_after.map(Addr::unchecked);
    let start = start_addr.as_ref().map(Bound::exclusive);
    let validators = VALIDATORS
        .range(store, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, validator)| validator))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(ValidatorsResponse { validators })
}

pub fn query_next_l2_sequence(store: &dyn Storage) -> StdResult<SequenceResponse> {
    Ok(SequenceResponse {
        sequence: peek_l2_sequence(store)?,
    })
}

pub fn query_finalized_l1_sequence(
    store: &dyn Storage,
    sequence: u64,
) -> StdResult<FinalizedSequenceResponse> {
    Ok(FinalizedSequenceResponse {
        finalized: has_finalized_l1_sequence(store, sequence),
    })
}

pub fn query_denom_pair(store: &dyn Storage, denom: String) -> StdResult<DenomPairResponse> {
    let base_denom = DENOM_PAIRS
        .may_load(store, &denom)?
        .ok_or_else(|| StdError::not_found(format!("denom pair {}", denom)))?;
    Ok(DenomPairResponse {
        denom_pair: DenomPair { denom, base_denom },
    })
}

pub fn query_migration_info(store: &dyn Storage, denom: String) -> StdResult<MigrationInfoResponse> {
    let migration_info = MIGRATION_INFOS
        .may_load(store, &denom)?
        .ok_or_else(|| StdError::not_found(format!("migration info {}", denom)))?;
    let base_denom = DENOM_PAIRS.load(store, &denom)?;
    let ibc_denom = ibc_denom(&prefixed_denom(
        &migration_info.ibc_port_id,
        &migration_info.ibc_channel_id,
        &base_denom,
    ));
    Ok(MigrationInfoResponse {
        migration_info,
        ibc_denom,
    })
}
