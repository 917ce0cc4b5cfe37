//! Validator set of the child chain.
//!
//! Validators are stored by operator address and indexed by consensus
//! address. At every end block the active set (positive power, highest power
//! first, capped at `max_validators`) is diffed against the powers applied at
//! the previous end block; the diff is what the consensus engine receives.
//! Validators whose power dropped to zero are reported with power 0 and then
//! deleted.

use std::collections::BTreeMap;

use cosmwasm_std::{Addr, Event, Order, StdResult, Storage};
use opinit_common::address::consensus_address;
use opinit_common::CacheStore;
use tracing::info;

use crate::error::ChildError;
use crate::keeper::load_params;
use crate::state::{
    Validator, ValidatorUpdate, LAST_VALIDATOR_POWERS, VALIDATORS, VALIDATORS_BY_CONS_ADDR,
};

/// Length of an ed25519 public key
pub const PUBKEY_LENGTH: usize = 32;

/// Validator updates produced by [`end_block`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndBlock {
    pub validator_updates: Vec<ValidatorUpdate>,
    pub events: Vec<Event>,
}

pub fn load_validator(store: &dyn Storage, operator: &Addr) -> Result<Validator, ChildError> {
    VALIDATORS
        .may_load(store, operator)?
        .ok_or_else(|| ChildError::ValidatorNotFound {
            address: operator.to_string(),
        })
}

/// Insert a new validator and index it by consensus address.
pub fn insert_validator(store: &mut dyn Storage, validator: &Validator) -> Result<(), ChildError> {
    if validator.consensus_pubkey.len() != PUBKEY_LENGTH {
        return Err(ChildError::InvalidPubkey {
            got: validator.consensus_pubkey.len(),
        });
    }
    if VALIDATORS.has(store, &validator.operator_address) {
        return Err(ChildError::ValidatorAlreadyExists {
            address: validator.operator_address.to_string(),
        });
    }
    let cons_addr = consensus_address(&validator.consensus_pubkey);
    if let Some(owner) = VALIDATORS_BY_CONS_ADDR.may_load(store, &cons_addr)? {
        return Err(ChildError::ValidatorAlreadyExists {
            address: owner.to_string(),
        });
    }

    VALIDATORS.save(store, &validator.operator_address, validator)?;
    VALIDATORS_BY_CONS_ADDR.save(store, &cons_addr, &validator.operator_address)?;
    Ok(())
}

/// Drop a validator to zero power; it leaves the set at the next end block.
pub fn schedule_removal(store: &mut dyn Storage, operator: &Addr) -> Result<Validator, ChildError> {
    let mut validator = load_validator(store, operator)?;
    validator.consensus_power = 0;
    VALIDATORS.save(store, operator, &validator)?;
    Ok(validator)
}

fn delete_validator(store: &mut dyn Storage, validator: &Validator) {
    VALIDATORS.remove(store, &validator.operator_address);
    VALIDATORS_BY_CONS_ADDR.remove(store, &consensus_address(&validator.consensus_pubkey));
}

pub fn validator_by_consensus_address(
    store: &dyn Storage,
    cons_addr: &[u8],
) -> StdResult<Option<Validator>> {
    match VALIDATORS_BY_CONS_ADDR.may_load(store, cons_addr)? {
        Some(operator) => VALIDATORS.may_load(store, &operator),
        None => Ok(None),
    }
}

/// Powers applied at the last end block.
///
/// More entries than `max_validators` is a broken invariant, not a user error.
pub fn last_validator_powers(
    store: &dyn Storage,
    max_validators: u32,
) -> Result<BTreeMap<Addr, u64>, ChildError> {
    let powers = LAST_VALIDATOR_POWERS
        .range(store, None, None, Order::Ascending)
        .collect::<StdResult<BTreeMap<_, _>>>()?;
    if powers.len() > max_validators as usize {
        return Err(ChildError::ValidatorSetOverflow {
            count: powers.len(),
            max: max_validators,
        });
    }
    Ok(powers)
}

/// Active validators: positive power, highest first, ties by operator address.
pub fn active_validators(store: &dyn Storage, max_validators: u32) -> StdResult<Vec<Validator>> {
    let mut active = VALIDATORS
        .range(store, None, None, Order::Ascending)
        .map(|item| item.map(|(_, validator)| validator))
        .filter(|item| !matches!(item, Ok(validator) if validator.consensus_power == 0))
        .collect::<StdResult<Vec<_>>>()?;
    active.sort_by(|a, b| {
        b.consensus_power
            .cmp(&a.consensus_power)
            .then_with(|| a.operator_address.cmp(&b.operator_address))
    });
    active.truncate(max_validators as usize);
    Ok(active)
}

/// Diff the active set against the last applied powers and persist the new powers.
pub fn block_validator_updates(
    store: &mut dyn Storage,
    max_validators: u32,
) -> Result<Vec<ValidatorUpdate>, ChildError> {
    let mut last = last_validator_powers(store, max_validators)?;
    let active = active_validators(store, max_validators)?;

    let mut updates = vec![];
    for validator in &active {
        let previous = last.remove(&validator.operator_address);
        if previous != Some(validator.consensus_power) {
            updates.push(ValidatorUpdate {
                pubkey: validator.consensus_pubkey.clone(),
                power: validator.consensus_power,
            });
            LAST_VALIDATOR_POWERS.save(
                store,
                &validator.operator_address,
                &validator.consensus_power,
            )?;
        }
    }

    // Whatever is left was applied before but is no longer active
    for operator in last.keys() {
        let validator = load_validator(store, operator)?;
        updates.push(ValidatorUpdate {
            pubkey: validator.consensus_pubkey,
            power: 0,
        });
        LAST_VALIDATOR_POWERS.remove(store, operator);
    }

    Ok(updates)
}

/// End-block hook: apply the validator diff and delete zero-power validators.
pub fn end_block(storage: &mut dyn Storage) -> Result<EndBlock, ChildError> {
    let mut cache = CacheStore::new(storage);
    let params = load_params(&cache)?;
    let validator_updates = block_validator_updates(&mut cache, params.max_validators)?;

    let retired = VALIDATORS
        .range(&cache, None, None, Order::Ascending)
        .filter_map(|item| match item {
            Ok((_, validator)) if validator.consensus_power == 0 => Some(Ok(validator)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
        .collect::<StdResult<Vec<_>>>()?;
    for validator in &retired {
        delete_validator(&mut cache, validator);
    }
    cache.commit();

    if !validator_updates.is_empty() {
        info!(
            updates = validator_updates.len(),
            removed = retired.len(),
            "validator set updated"
        );
    }

    let events = validator_updates
        .iter()
        .map(|update| {
            Event::new("validator_update")
                .add_attribute("pubkey", hex::encode(update.pubkey.as_slice()))
                .add_attribute("power", update.power.to_string())
        })
        .collect();

    Ok(EndBlock {
        validator_updates,
        events,
    })
}
