//! Genesis import and export of the host bridge state.
//!
//! Balances are not part of this state: escrowed coins belong to the bank
//! genesis of the host platform.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Empty, Order, StdResult, Storage};
use cw2::set_contract_version;
use opinit_common::{address, l2_denom, CacheStore};
use tracing::info;

use crate::error::HostError;
use crate::execute::validate_params;
use crate::keeper::{load_authority, load_params, validate_bridge_config};
use crate::state::{
    BatchInfoWithOutput, BridgeConfig, MigrationInfo, OraclePriceHash, Output, Params, AUTHORITY,
    BATCH_INFOS, BRIDGE_CONFIGS, CONTRACT_NAME, CONTRACT_VERSION, INITIAL_SEQUENCE,
    MIGRATION_INFOS, NEXT_BRIDGE_ID, NEXT_L1_SEQUENCES, NEXT_OUTPUT_INDEXES, ORACLE_PRICE_HASH,
    OUTPUT_PROPOSALS, PARAMS, PROVEN_WITHDRAWALS, TOKEN_PAIRS,
};

#[cw_serde]
pub struct GenesisState {
    pub authority: Addr,
    pub params: Params,
    pub bridges: Vec<BridgeGenesis>,
    pub next_bridge_id: u64,
    pub oracle_price_hash: Option<OraclePriceHash>,
}

#[cw_serde]
pub struct BridgeGenesis {
    pub bridge_id: u64,
    pub bridge_config: BridgeConfig,
    pub next_l1_sequence: u64,
    pub next_output_index: u64,
    pub proposals: Vec<OutputGenesis>,
    pub token_pairs: Vec<TokenPair>,
    /// 32-byte withdrawal hashes
    pub proven_withdrawals: Vec<Binary>,
    pub batch_infos: Vec<BatchInfoWithOutput>,
    pub migration_infos: Vec<MigrationInfo>,
}

#[cw_serde]
pub struct OutputGenesis {
    pub output_index: u64,
    pub output: Output,
}

#[cw_serde]
pub struct TokenPair {
    pub l1_denom: String,
    pub l2_denom: String,
}

/// Load a genesis state into an empty store.
///
/// The import is all or nothing: a rejected genesis leaves the store untouched.
pub fn init_genesis(storage: &mut dyn Storage, genesis: &GenesisState) -> Result<(), HostError> {
    let mut cache = CacheStore::new(storage);
    import_genesis(&mut cache, genesis)?;
    cache.commit();
    Ok(())
}

fn import_genesis(storage: &mut dyn Storage, genesis: &GenesisState) -> Result<(), HostError> {
    validate_params(&genesis.params)?;
    let prefix = genesis.params.bech32_prefix.as_str();
    let authority = address::validate(prefix, genesis.authority.as_str())?;
    if genesis.next_bridge_id < INITIAL_SEQUENCE {
        return Err(HostError::InvalidBridgeId);
    }

    set_contract_version(storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    AUTHORITY.save(storage, &authority)?;
    PARAMS.save(storage, &genesis.params)?;
    NEXT_BRIDGE_ID.save(storage, &genesis.next_bridge_id)?;
    if let Some(attestation) = &genesis.oracle_price_hash {
        ORACLE_PRICE_HASH.save(storage, attestation)?;
    }

    for bridge in &genesis.bridges {
        init_bridge(storage, prefix, genesis.next_bridge_id, bridge)?;
    }

    info!(bridges = genesis.bridges.len(), "host genesis imported");
    Ok(())
}

fn init_bridge(
    storage: &mut dyn Storage,
    prefix: &str,
    next_bridge_id: u64,
    bridge: &BridgeGenesis,
) -> Result<(), HostError> {
    let bridge_id = bridge.bridge_id;
    if bridge_id == 0 || bridge_id >= next_bridge_id {
        return Err(HostError::InvalidBridgeId);
    }
    if bridge.next_l1_sequence < INITIAL_SEQUENCE {
        return Err(HostError::InvalidSequence);
    }
    validate_output_ledger(bridge)?;
    if bridge.batch_infos.is_empty() {
        return Err(HostError::InvalidBatchInfo {
            reason: format!("bridge {} has no creation batch info", bridge_id),
        });
    }

    let config = validate_bridge_config(prefix, &bridge.bridge_config)?;
    BRIDGE_CONFIGS.save(storage, bridge_id, &config)?;
    NEXT_L1_SEQUENCES.save(storage, bridge_id, &bridge.next_l1_sequence)?;
    NEXT_OUTPUT_INDEXES.save(storage, bridge_id, &bridge.next_output_index)?;

    for proposal in &bridge.proposals {
        OUTPUT_PROPOSALS.save(storage, (bridge_id, proposal.output_index), &proposal.output)?;
    }

    for pair in &bridge.token_pairs {
        if l2_denom(bridge_id, &pair.l1_denom) != pair.l2_denom {
            return Err(HostError::TokenPairNotFound {
                bridge_id,
                denom: pair.l2_denom.clone(),
            });
        }
        TOKEN_PAIRS.save(storage, (bridge_id, pair.l2_denom.as_str()), &pair.l1_denom)?;
    }

    for hash in &bridge.proven_withdrawals {
        if hash.len() != 32 {
            return Err(HostError::InvalidHashLength {
                field: "proven_withdrawals".to_string(),
                got: hash.len(),
            });
        }
        PROVEN_WITHDRAWALS.save(storage, (bridge_id, hash.as_slice()), &Empty {})?;
    }

    for (position, entry) in bridge.batch_infos.iter().enumerate() {
        BATCH_INFOS.save(storage, (bridge_id, position as u64), entry)?;
    }

    for migration in &bridge.migration_infos {
        MIGRATION_INFOS.save(storage, (bridge_id, migration.l1_denom.as_str()), migration)?;
    }
    Ok(())
}

/// Outputs must be contiguous from index 1 up to the next output index, with
/// strictly increasing L2 block numbers.
fn validate_output_ledger(bridge: &BridgeGenesis) -> Result<(), HostError> {
    if bridge.next_output_index < INITIAL_SEQUENCE {
        return Err(HostError::InvalidOutputIndex {
            expected: INITIAL_SEQUENCE,
            got: bridge.next_output_index,
        });
    }

    let mut last_l2_block = None;
    for (expected, proposal) in (INITIAL_SEQUENCE..).zip(&bridge.proposals) {
        if proposal.output_index != expected {
            return Err(HostError::InvalidOutputIndex {
                expected,
                got: proposal.output_index,
            });
        }
        let l2_block_number = proposal.output.l2_block_number;
        if let Some(last) = last_l2_block {
            if l2_block_number <= last {
                return Err(HostError::InvalidL2BlockNumber {
                    last,
                    got: l2_block_number,
                });
            }
        }
        last_l2_block = Some(l2_block_number);
    }

    let expected_next = INITIAL_SEQUENCE + bridge.proposals.len() as u64;
    if bridge.next_output_index != expected_next {
        return Err(HostError::InvalidOutputIndex {
            expected: expected_next,
            got: bridge.next_output_index,
        });
    }
    Ok(())
}

/// Dump the complete host state.
pub fn export_genesis(storage: &dyn Storage) -> StdResult<GenesisState> {
    let bridges = BRIDGE_CONFIGS
        .range(storage, None, None, Order::Ascending)
        .map(|item| {
            let (bridge_id, bridge_config) = item?;
            export_bridge(storage, bridge_id, bridge_config)
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(GenesisState {
        authority: load_authority(storage)?,
        params: load_params(storage)?,
        bridges,
        next_bridge_id: NEXT_BRIDGE_ID.load(storage)?,
        oracle_price_hash: ORACLE_PRICE_HASH.may_load(storage)?,
    })
}

fn export_bridge(
    storage: &dyn Storage,
    bridge_id: u64,
    bridge_config: BridgeConfig,
) -> StdResult<BridgeGenesis> {
    let proposals = OUTPUT_PROPOSALS
        .prefix(bridge_id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(output_index, output)| OutputGenesis { output_index, output }))
        .collect::<StdResult<Vec<_>>>()?;

    let token_pairs = TOKEN_PAIRS
        .prefix(bridge_id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(l2_denom, l1_denom)| TokenPair { l1_denom, l2_denom }))
        .collect::<StdResult<Vec<_>>>()?;

    let proven_withdrawals = PROVEN_WITHDRAWALS
        .prefix(bridge_id)
        .keys(storage, None, None, Order::Ascending)
        .map(|key| key.map(Binary::from))
        .collect::<StdResult<Vec<_>>>()?;

    let batch_infos = BATCH_INFOS
        .prefix(bridge_id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, entry)| entry))
        .collect::<StdResult<Vec<_>>>()?;

    let migration_infos = MIGRATION_INFOS
        .prefix(bridge_id)
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, migration)| migration))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(BridgeGenesis {
        bridge_id,
        bridge_config,
        next_l1_sequence: NEXT_L1_SEQUENCES
            .may_load(storage, bridge_id)?
            .unwrap_or(INITIAL_SEQUENCE),
        next_output_index: NEXT_OUTPUT_INDEXES
            .may_load(storage, bridge_id)?
            .unwrap_or(INITIAL_SEQUENCE),
        proposals,
        token_pairs,
        proven_withdrawals,
        batch_infos,
        migration_infos,
    })
}
