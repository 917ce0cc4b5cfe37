//! Authority-only handlers and the admin batch that runs them.

use cosmwasm_std::{Binary, Env, Event, MessageInfo, Response};
use opinit_common::address;
use opinit_common::ibc::{ibc_denom, prefixed_denom};
use tracing::info;

use crate::contract::dispatch;
use crate::deps::ChildDeps;
use crate::error::ChildError;
use crate::keeper::{ensure_authority, load_authority, load_params, validate_params};
use crate::msg::ExecuteMsg;
use crate::state::{
    MigrationInfo, Params, Validator, DEFAULT_CONSENSUS_POWER, DENOM_PAIRS, IBC_TO_L2_DENOMS,
    MIGRATION_INFOS, PARAMS,
};
use crate::validators::{insert_validator, schedule_removal};

/// Run a batch of authority messages signed by the params admin.
///
/// Every message executes with the module authority as signer; the first
/// failure aborts the whole batch.
pub fn execute_messages(
    mut deps: ChildDeps,
    env: Env,
    info: MessageInfo,
    messages: Vec<ExecuteMsg>,
) -> Result<Response, ChildError> {
    let params = load_params(deps.storage)?;
    if info.sender != params.admin {
        return Err(ChildError::unauthorized(&info.sender));
    }
    if messages.is_empty() {
        return Err(ChildError::EmptyMessages);
    }
    for msg in &messages {
        if matches!(msg, ExecuteMsg::ExecuteMessages { .. }) {
            return Err(ChildError::NestedExecuteMessages);
        }
        if !msg.is_authority_message() {
            return Err(ChildError::NotAuthorityMessage {
                msg: msg.name().to_string(),
            });
        }
    }

    let authority = load_authority(deps.storage)?;
    let count = messages.len();
    let mut response = Response::new();
    for msg in messages {
        let sub_info = MessageInfo {
            sender: authority.clone(),
            funds: vec![],
        };
        let sub = dispatch(deps.branch(), env.clone(), sub_info, msg)?;
        response = response.add_events(sub.events);
    }

    Ok(response.add_event(
        Event::new("execute_messages")
            .add_attribute("sender", info.sender)
            .add_attribute("count", count.to_string()),
    ))
}

// ============================================================================
// Validator Set
// ============================================================================

pub fn execute_add_validator(
    deps: ChildDeps,
    _env: Env,
    info: MessageInfo,
    moniker: String,
    operator_address: String,
    consensus_pubkey: Binary,
) -> Result<Response, ChildError> {
    ensure_authority(deps.storage, &info.sender)?;
    let params = load_params(deps.storage)?;
    let operator = address::validate(&params.bech32_prefix, &operator_address)?;

    let validator = Validator {
        operator_address: operator.clone(),
        consensus_pubkey,
        moniker,
        consensus_power: DEFAULT_CONSENSUS_POWER,
    };
    insert_validator(deps.storage, &validator)?;

    info!(operator = %operator, moniker = %validator.moniker, "validator added");

    Ok(Response::new().add_event(
        Event::new("add_validator")
            .add_attribute("operator_address", operator)
            .add_attribute("moniker", validator.moniker)
            .add_attribute(
                "consensus_pubkey",
                hex::encode(validator.consensus_pubkey.as_slice()),
            ),
    ))
}

pub fn execute_remove_validator(
    deps: ChildDeps,
    _env: Env,
    info: MessageInfo,
    operator_address: String,
) -> Result<Response, ChildError> {
    ensure_authority(deps.storage, &info.sender)?;
    let params = load_params(deps.storage)?;
    let operator = address::validate(&params.bech32_prefix, &operator_address)?;
    schedule_removal(deps.storage, &operator)?;

    info!(operator = %operator, "validator scheduled for removal");

    Ok(Response::new()
        .add_event(Event::new("remove_validator").add_attribute("operator_address", operator)))
}

// ============================================================================
// Governance
// ============================================================================

pub fn execute_update_params(
    deps: ChildDeps,
    _env: Env,
    info: MessageInfo,
    params: Params,
) -> Result<Response, ChildError> {
    ensure_authority(deps.storage, &info.sender)?;
    let params = validate_params(deps.storage, &params)?;
    PARAMS.save(deps.storage, &params)?;

    info!(prefix = %params.bech32_prefix, max_validators = params.max_validators, "params updated");

    Ok(Response::new().add_event(
        Event::new("update_params")
            .add_attribute(
                "bridge_executors",
                params
                    .bridge_executors
                    .iter()
                    .map(|executor| executor.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            )
            .add_attribute("admin", params.admin)
            .add_attribute("max_validators", params.max_validators.to_string())
            .add_attribute("bech32_prefix", params.bech32_prefix),
    ))
}

/// Map the vouchers of `port/channel/<base denom>` onto an L2 denom.
pub fn execute_register_migration_info(
    deps: ChildDeps,
    _env: Env,
    info: MessageInfo,
    migration_info: MigrationInfo,
) -> Result<Response, ChildError> {
    ensure_authority(deps.storage, &info.sender)?;
    for (field, value) in [
        ("denom", &migration_info.denom),
        ("ibc_port_id", &migration_info.ibc_port_id),
        ("ibc_channel_id", &migration_info.ibc_channel_id),
    ] {
        if value.trim().is_empty() {
            return Err(ChildError::InvalidMigrationInfo {
                reason: format!("{} is empty", field),
            });
        }
    }

    let base_denom = DENOM_PAIRS
        .may_load(deps.storage, &migration_info.denom)?
        .ok_or_else(|| ChildError::TokenPairNotFound {
            denom: migration_info.denom.clone(),
        })?;
    let voucher = ibc_denom(&prefixed_denom(
        &migration_info.ibc_port_id,
        &migration_info.ibc_channel_id,
        &base_denom,
    ));

    if MIGRATION_INFOS.has(deps.storage, &migration_info.denom)
        || IBC_TO_L2_DENOMS.has(deps.storage, &voucher)
    {
        return Err(ChildError::MigrationInfoAlreadyRegistered {
            denom: migration_info.denom.clone(),
        });
    }
    MIGRATION_INFOS.save(deps.storage, &migration_info.denom, &migration_info)?;
    IBC_TO_L2_DENOMS.save(deps.storage, &voucher, &migration_info.denom)?;

    info!(denom = %migration_info.denom, ibc_denom = %voucher, "migration info registered");

    Ok(Response::new().add_event(
        Event::new("register_migration_info")
            .add_attribute("denom", migration_info.denom)
            .add_attribute("base_denom", base_denom)
            .add_attribute("ibc_port_id", migration_info.ibc_port_id)
            .add_attribute("ibc_channel_id", migration_info.ibc_channel_id)
            .add_attribute("ibc_denom", voucher),
    ))
}
