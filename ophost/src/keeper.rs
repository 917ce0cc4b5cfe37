//! Read-side helpers shared by execute handlers, queries and genesis.

use cosmwasm_std::{from_json, Addr, Binary, Order, StdResult, Storage, Timestamp};
use opinit_common::address;

use crate::error::HostError;
use crate::state::{
    BridgeConfig, BridgeMetadata, Output, Params, AUTHORITY, BRIDGE_CONFIGS, INITIAL_SEQUENCE,
    NEXT_L1_SEQUENCES, NEXT_OUTPUT_INDEXES, OUTPUT_PROPOSALS, PARAMS,
};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

pub fn load_params(store: &dyn Storage) -> StdResult<Params> {
    PARAMS.load(store)
}

pub fn load_authority(store: &dyn Storage) -> StdResult<Addr> {
    AUTHORITY.load(store)
}

pub fn load_bridge_config(store: &dyn Storage, bridge_id: u64) -> Result<BridgeConfig, HostError> {
    BRIDGE_CONFIGS
        .may_load(store, bridge_id)?
        .ok_or(HostError::BridgeNotFound { bridge_id })
}

pub fn next_l1_sequence(store: &dyn Storage, bridge_id: u64) -> StdResult<u64> {
    Ok(NEXT_L1_SEQUENCES
        .may_load(store, bridge_id)?
        .unwrap_or(INITIAL_SEQUENCE))
}

pub fn next_output_index(store: &dyn Storage, bridge_id: u64) -> StdResult<u64> {
    Ok(NEXT_OUTPUT_INDEXES
        .may_load(store, bridge_id)?
        .unwrap_or(INITIAL_SEQUENCE))
}

pub fn load_output(store: &dyn Storage, bridge_id: u64, output_index: u64) -> Result<Output, HostError> {
    OUTPUT_PROPOSALS
        .may_load(store, (bridge_id, output_index))?
        .ok_or(HostError::OutputNotFound {
            bridge_id,
            output_index,
        })
}

/// An output is final once its finalization period has fully elapsed.
pub fn is_finalized(config: &BridgeConfig, output: &Output, now: Timestamp) -> bool {
    let period_ns = config.finalization_period.saturating_mul(NANOS_PER_SECOND);
    now.nanos() >= output.l1_block_time.nanos().saturating_add(period_ns)
}

/// The highest-indexed finalized output of a bridge, if any.
pub fn last_finalized_output(
    store: &dyn Storage,
    bridge_id: u64,
    config: &BridgeConfig,
    now: Timestamp,
) -> StdResult<Option<(u64, Output)>> {
    for item in OUTPUT_PROPOSALS
        .prefix(bridge_id)
        .range(store, None, None, Order::Descending)
    {
        let (output_index, output) = item?;
        if is_finalized(config, &output, now) {
            return Ok(Some((output_index, output)));
        }
    }
    Ok(None)
}

/// Parse bridge metadata; empty metadata carries no channels.
pub fn parse_metadata(metadata: &Binary) -> Result<BridgeMetadata, HostError> {
    if metadata.is_empty() {
        return Ok(BridgeMetadata::default());
    }
    from_json(metadata).map_err(|e| HostError::InvalidBridgeMetadata {
        reason: e.to_string(),
    })
}

/// Validate a bridge config and normalize its role addresses.
pub fn validate_bridge_config(prefix: &str, config: &BridgeConfig) -> Result<BridgeConfig, HostError> {
    if config.finalization_period == 0 {
        return Err(HostError::InvalidBridgeConfig {
            reason: "finalization period must be positive".to_string(),
        });
    }
    if config.submission_interval == 0 {
        return Err(HostError::InvalidBridgeConfig {
            reason: "submission interval must be positive".to_string(),
        });
    }
    if config.submission_start_time == Timestamp::default() {
        return Err(HostError::InvalidBridgeConfig {
            reason: "submission start time must be set".to_string(),
        });
    }
    validate_batch_info_fields(&config.batch_info.submitter, &config.batch_info.chain_type)?;
    parse_metadata(&config.metadata)?;

    let mut normalized = config.clone();
    normalized.proposer = address::validate(prefix, config.proposer.as_str())?;
    normalized.challenger = address::validate(prefix, config.challenger.as_str())?;
    Ok(normalized)
}

pub fn validate_batch_info_fields(submitter: &str, chain_type: &str) -> Result<(), HostError> {
    if submitter.trim().is_empty() && chain_type.trim().is_empty() {
        return Err(HostError::EmptyBatchInfo);
    }
    if submitter.trim().is_empty() {
        return Err(HostError::InvalidBatchInfo {
            reason: "submitter is empty".to_string(),
        });
    }
    if chain_type.trim().is_empty() {
        return Err(HostError::InvalidBatchInfo {
            reason: "chain type is empty".to_string(),
        });
    }
    Ok(())
}

/// Bridge ids are assigned from 1.
pub fn ensure_bridge_id(bridge_id: u64) -> Result<(), HostError> {
    if bridge_id == 0 {
        return Err(HostError::InvalidBridgeId);
    }
    Ok(())
}

pub fn ensure_authority(store: &dyn Storage, signer: &Addr) -> Result<(), HostError> {
    if *signer != load_authority(store)? {
        return Err(HostError::unauthorized(signer));
    }
    Ok(())
}

/// Governance may always act; otherwise `signer` must hold `role`.
pub fn ensure_authority_or(store: &dyn Storage, signer: &Addr, role: &Addr) -> Result<(), HostError> {
    if signer == role {
        return Ok(());
    }
    ensure_authority(store, signer)
}
