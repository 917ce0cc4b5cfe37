//! Shared state accessors of the child bridge.

use cosmwasm_std::{Addr, Empty, StdResult, Storage};
use opinit_common::address;

use crate::error::ChildError;
use crate::state::{
    BridgeInfo, Params, AUTHORITY, BRIDGE_INFO, FINALIZED_L1_SEQUENCES, INITIAL_SEQUENCE,
    LAST_VALIDATOR_POWERS, NEXT_L2_SEQUENCE, PARAMS,
};

pub fn load_params(store: &dyn Storage) -> StdResult<Params> {
    PARAMS.load(store)
}

pub fn load_authority(store: &dyn Storage) -> StdResult<Addr> {
    AUTHORITY.load(store)
}

pub fn load_bridge_info(store: &dyn Storage) -> Result<BridgeInfo, ChildError> {
    BRIDGE_INFO
        .may_load(store)?
        .ok_or(ChildError::BridgeInfoNotSet)
}

pub fn ensure_authority(store: &dyn Storage, signer: &Addr) -> Result<(), ChildError> {
    if *signer != load_authority(store)? {
        return Err(ChildError::unauthorized(signer));
    }
    Ok(())
}

pub fn ensure_bridge_executor(store: &dyn Storage, signer: &Addr) -> Result<(), ChildError> {
    let params = load_params(store)?;
    if !params.bridge_executors.contains(signer) {
        return Err(ChildError::unauthorized(signer));
    }
    Ok(())
}

// ============================================================================
// Sequences
// ============================================================================

/// Mark an L1 deposit as credited; marking twice is harmless.
pub fn record_finalized_l1_sequence(store: &mut dyn Storage, sequence: u64) -> StdResult<()> {
    FINALIZED_L1_SEQUENCES.save(store, sequence, &Empty {})
}

pub fn has_finalized_l1_sequence(store: &dyn Storage, sequence: u64) -> bool {
    FINALIZED_L1_SEQUENCES.has(store, sequence)
}

/// Return the current outbound sequence and advance the counter.
pub fn next_l2_sequence(store: &mut dyn Storage) -> Result<u64, ChildError> {
    let sequence = NEXT_L2_SEQUENCE
        .may_load(store)?
        .unwrap_or(INITIAL_SEQUENCE);
    let next = sequence.checked_add(1).ok_or(ChildError::Overflow)?;
    NEXT_L2_SEQUENCE.save(store, &next)?;
    Ok(sequence)
}

pub fn peek_l2_sequence(store: &dyn Storage) -> StdResult<u64> {
    Ok(NEXT_L2_SEQUENCE
        .may_load(store)?
        .unwrap_or(INITIAL_SEQUENCE))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate params and normalize their addresses.
///
/// `max_validators` may not drop below the size of the applied validator set.
pub fn validate_params(store: &dyn Storage, params: &Params) -> Result<Params, ChildError> {
    let prefix = params.bech32_prefix.trim();
    if prefix.is_empty() {
        return Err(ChildError::InvalidParams {
            reason: "bech32 prefix is empty".to_string(),
        });
    }
    if params.max_validators == 0 {
        return Err(ChildError::InvalidParams {
            reason: "max validators must be positive".to_string(),
        });
    }
    if params.bridge_executors.is_empty() {
        return Err(ChildError::InvalidParams {
            reason: "at least one bridge executor is required".to_string(),
        });
    }

    let applied = LAST_VALIDATOR_POWERS
        .keys(store, None, None, cosmwasm_std::Order::Ascending)
        .count();
    if applied > params.max_validators as usize {
        return Err(ChildError::InvalidParams {
            reason: format!(
                "max validators {} is below the current set size {}",
                params.max_validators, applied
            ),
        });
    }

    let bridge_executors = params
        .bridge_executors
        .iter()
        .map(|executor| address::validate(prefix, executor.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Params {
        bridge_executors,
        admin: address::validate(prefix, params.admin.as_str())?,
        max_validators: params.max_validators,
        bech32_prefix: prefix.to_string(),
    })
}
