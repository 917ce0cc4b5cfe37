//! Genesis import and export of the child bridge state.
//!
//! Balances belong to the bank genesis and are not part of this state.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Empty, Order, StdResult, Storage};
use cw2::set_contract_version;
use opinit_common::{address, CacheStore};
use opinit_common::ibc::{ibc_denom, prefixed_denom};
use tracing::info;

use crate::error::ChildError;
use crate::execute::validate_bridge_info;
use crate::keeper::{load_authority, load_params, peek_l2_sequence, validate_params};
use crate::state::{
    BridgeInfo, DenomPair, MigrationInfo, Params, Validator, AUTHORITY, BRIDGE_INFO,
    CONTRACT_NAME, CONTRACT_VERSION, DENOM_PAIRS, FINALIZED_L1_SEQUENCES, IBC_TO_L2_DENOMS,
    INITIAL_SEQUENCE, LAST_VALIDATOR_POWERS, MIGRATION_INFOS, NEXT_L2_SEQUENCE, PARAMS,
    VALIDATORS,
};
use crate::validators::insert_validator;

#[cw_serde]
pub struct GenesisState {
    pub authority: Addr,
    pub params: Params,
    pub bridge_info: Option<BridgeInfo>,
    pub validators: Vec<Validator>,
    pub last_validator_powers: Vec<LastValidatorPower>,
    pub finalized_l1_sequences: Vec<u64>,
    pub next_l2_sequence: u64,
    pub denom_pairs: Vec<DenomPair>,
    pub migration_infos: Vec<MigrationInfo>,
}

#[cw_serde]
pub struct LastValidatorPower {
    pub operator_address: Addr,
    pub power: u64,
}

/// Load a genesis state into an empty store.
///
/// The import is all or nothing: a rejected genesis leaves the store untouched.
pub fn init_genesis(storage: &mut dyn Storage, genesis: &GenesisState) -> Result<(), ChildError> {
    let mut cache = CacheStore::new(storage);
    import_genesis(&mut cache, genesis)?;
    cache.commit();
    Ok(())
}

fn import_genesis(storage: &mut dyn Storage, genesis: &GenesisState) -> Result<(), ChildError> {
    // Powers are not stored yet, so the set size is checked here
    let params = validate_params(storage, &genesis.params)?;
    if genesis.last_validator_powers.len() > params.max_validators as usize {
        return Err(ChildError::ValidatorSetOverflow {
            count: genesis.last_validator_powers.len(),
            max: params.max_validators,
        });
    }
    let authority = address::validate(&params.bech32_prefix, genesis.authority.as_str())?;
    if genesis.next_l2_sequence < INITIAL_SEQUENCE {
        return Err(ChildError::InvalidSequence);
    }

    set_contract_version(storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    AUTHORITY.save(storage, &authority)?;
    PARAMS.save(storage, &params)?;
    NEXT_L2_SEQUENCE.save(storage, &genesis.next_l2_sequence)?;
    if let Some(bridge_info) = &genesis.bridge_info {
        validate_bridge_info(bridge_info)?;
        BRIDGE_INFO.save(storage, bridge_info)?;
    }

    for validator in &genesis.validators {
        insert_validator(storage, validator)?;
    }
    for entry in &genesis.last_validator_powers {
        if !VALIDATORS.has(storage, &entry.operator_address) {
            return Err(ChildError::ValidatorNotFound {
                address: entry.operator_address.to_string(),
            });
        }
        LAST_VALIDATOR_POWERS.save(storage, &entry.operator_address, &entry.power)?;
    }

    for sequence in &genesis.finalized_l1_sequences {
        if *sequence == 0 {
            return Err(ChildError::InvalidSequence);
        }
        FINALIZED_L1_SEQUENCES.save(storage, *sequence, &Empty {})?;
    }

    for pair in &genesis.denom_pairs {
        DENOM_PAIRS.save(storage, &pair.denom, &pair.base_denom)?;
    }
    for migration in &genesis.migration_infos {
        let base_denom = DENOM_PAIRS.may_load(storage, &migration.denom)?.ok_or_else(|| {
            ChildError::TokenPairNotFound {
                denom: migration.denom.clone(),
            }
        })?;
        let voucher = ibc_denom(&prefixed_denom(
            &migration.ibc_port_id,
            &migration.ibc_channel_id,
            &base_denom,
        ));
        MIGRATION_INFOS.save(storage, &migration.denom, migration)?;
        IBC_TO_L2_DENOMS.save(storage, &voucher, &migration.denom)?;
    }

    info!(
        validators = genesis.validators.len(),
        denoms = genesis.denom_pairs.len(),
        "child genesis imported"
    );
    Ok(())
}

/// Dump the complete child state.
pub fn export_genesis(storage: &dyn Storage) -> StdResult<GenesisState> {
    let validators = VALIDATORS
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, validator)| validator))
        .collect::<StdResult<Vec<_>>>()?;

    let last_validator_powers = LAST_VALIDATOR_POWERS
        .range(storage, None, None, Order::Ascending)
        .map(|item| {
            item.map(|(operator_address, power)| LastValidatorPower {
                operator_address,
                power,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    let finalized_l1_sequences = FINALIZED_L1_SEQUENCES
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    let denom_pairs = DENOM_PAIRS
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(denom, base_denom)| DenomPair { denom, base_denom }))
        .collect::<StdResult<Vec<_>>>()?;

    let migration_infos = MIGRATION_INFOS
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, migration)| migration))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(GenesisState {
        authority: load_authority(storage)?,
        params: load_params(storage)?,
        bridge_info: BRIDGE_INFO.may_load(storage)?,
        validators,
        last_validator_powers,
        finalized_l1_sequences,
        next_l2_sequence: peek_l2_sequence(storage)?,
        denom_pairs,
        migration_infos,
    })
}
