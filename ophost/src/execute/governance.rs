//! Authority-only handlers.

use cosmwasm_std::{Coin, Env, Event, MessageInfo, Response};
use opinit_common::address;
use tracing::info;

use crate::deps::HostDeps;
use crate::error::HostError;
use crate::keeper::{ensure_authority, load_bridge_config, load_params};
use crate::state::{MigrationInfo, Params, MIGRATION_INFOS, PARAMS};

pub fn execute_update_params(
    deps: HostDeps,
    _env: Env,
    info: MessageInfo,
    params: Params,
) -> Result<Response, HostError> {
    ensure_authority(deps.storage, &info.sender)?;
    validate_params(&params)?;
    PARAMS.save(deps.storage, &params)?;

    info!(prefix = %params.bech32_prefix, "params updated");

    Ok(Response::new().add_event(
        Event::new("update_params")
            .add_attribute("bech32_prefix", params.bech32_prefix)
            .add_attribute(
                "registration_fee",
                params
                    .registration_fee
                    .iter()
                    .map(Coin::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            )
            .add_attribute(
                "attestor_packet_timeout",
                params.attestor_packet_timeout.to_string(),
            ),
    ))
}

pub fn validate_params(params: &Params) -> Result<(), HostError> {
    if params.bech32_prefix.trim().is_empty() {
        return Err(HostError::InvalidParams {
            reason: "bech32 prefix is empty".to_string(),
        });
    }
    if params.attestor_packet_timeout == 0 {
        return Err(HostError::InvalidParams {
            reason: "attestor packet timeout must be positive".to_string(),
        });
    }
    for coin in &params.registration_fee {
        if coin.denom.trim().is_empty() || coin.amount.is_zero() {
            return Err(HostError::InvalidParams {
                reason: format!("invalid registration fee coin {}", coin),
            });
        }
    }
    Ok(())
}

/// Route future deposits of a denom through IBC.
///
/// Whatever the bridge already escrows in that denom moves to the escrow
/// account of the ICS-20 channel.
pub fn execute_register_migration_info(
    deps: HostDeps,
    _env: Env,
    info: MessageInfo,
    bridge_id: u64,
    migration_info: MigrationInfo,
) -> Result<Response, HostError> {
    ensure_authority(deps.storage, &info.sender)?;
    load_bridge_config(deps.storage, bridge_id)?;

    for (field, value) in [
        ("l1_denom", &migration_info.l1_denom),
        ("ibc_port_id", &migration_info.ibc_port_id),
        ("ibc_channel_id", &migration_info.ibc_channel_id),
    ] {
        if value.trim().is_empty() {
            return Err(HostError::InvalidMigrationInfo {
                reason: format!("{} is empty", field),
            });
        }
    }

    let key = (bridge_id, migration_info.l1_denom.as_str());
    if MIGRATION_INFOS.has(deps.storage, key) {
        return Err(HostError::MigrationInfoAlreadyRegistered {
            bridge_id,
            l1_denom: migration_info.l1_denom.clone(),
        });
    }
    MIGRATION_INFOS.save(deps.storage, key, &migration_info)?;

    let params = load_params(deps.storage)?;
    let bridge_addr = address::bridge_address(&params.bech32_prefix, bridge_id)?;
    let escrowed = deps
        .bank
        .balance(deps.storage, &bridge_addr, &migration_info.l1_denom)?;
    if !escrowed.is_zero() {
        let ibc_escrow = address::ics20_escrow_address(
            &params.bech32_prefix,
            &migration_info.ibc_port_id,
            &migration_info.ibc_channel_id,
        )?;
        deps.bank.send(
            deps.storage,
            &bridge_addr,
            &ibc_escrow,
            &[Coin::new(escrowed.u128(), &migration_info.l1_denom)],
        )?;
    }

    info!(
        bridge_id,
        l1_denom = %migration_info.l1_denom,
        channel = %migration_info.ibc_channel_id,
        swept = %escrowed,
        "migration info registered"
    );

    Ok(Response::new().add_event(
        Event::new("register_migration_info")
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("l1_denom", migration_info.l1_denom)
            .add_attribute("ibc_port_id", migration_info.ibc_port_id)
            .add_attribute("ibc_channel_id", migration_info.ibc_channel_id)
            .add_attribute("swept_amount", escrowed.to_string()),
    ))
}
