//! Deposit engine: L1 to L2 token flow.

use cosmwasm_std::{to_json_binary, Binary, Coin, Env, Event, MessageInfo, Response};
use opinit_common::ibc::TransferMsg;
use opinit_common::{address, l2_denom};
use tracing::{debug, info};

use crate::deps::HostDeps;
use crate::error::HostError;
use crate::keeper::{load_bridge_config, load_params, next_l1_sequence};
use crate::msg::InitiateTokenDepositResponse;
use crate::state::{MigrationInfo, MIGRATION_INFOS, NEXT_L1_SEQUENCES, TOKEN_PAIRS};

/// Memo of a forwarded deposit that carries no hook data
pub const FORWARDED_MEMO: &str = "forwarded from ophost module";

/// Relative timeout of forwarded ICS-20 transfers, in seconds
pub const FORWARD_TIMEOUT_SECONDS: u64 = 600;

pub fn execute_initiate_token_deposit(
    deps: HostDeps,
    env: Env,
    info: MessageInfo,
    bridge_id: u64,
    to: String,
    amount: Coin,
    data: Option<Binary>,
) -> Result<Response, HostError> {
    load_bridge_config(deps.storage, bridge_id)?;
    // `to` lives on L2, so any bech32 prefix is accepted
    address::decode(&to)?;
    if amount.denom.trim().is_empty() {
        return Err(HostError::InvalidAmount {
            reason: "denom is empty".to_string(),
        });
    }
    let data = data.unwrap_or_default();

    let sequence = next_l1_sequence(deps.storage, bridge_id)?;
    let next = sequence.checked_add(1).ok_or(HostError::Overflow)?;
    NEXT_L1_SEQUENCES.save(deps.storage, bridge_id, &next)?;

    let response = Response::new().set_data(to_json_binary(&InitiateTokenDepositResponse { sequence })?);

    if let Some(migration) = MIGRATION_INFOS.may_load(deps.storage, (bridge_id, amount.denom.as_str()))? {
        let events = forward_deposit(deps, &env, &info, &migration, &to, &amount, &data)?;
        debug!(bridge_id, sequence, denom = %amount.denom, "deposit forwarded over ibc");
        return Ok(response.add_events(events));
    }

    if !amount.amount.is_zero() {
        let params = load_params(deps.storage)?;
        let bridge_addr = address::bridge_address(&params.bech32_prefix, bridge_id)?;
        deps.bank
            .send(deps.storage, &info.sender, &bridge_addr, &[amount.clone()])?;
    }

    let l2_denom = l2_denom(bridge_id, &amount.denom);
    if !TOKEN_PAIRS.has(deps.storage, (bridge_id, l2_denom.as_str())) {
        TOKEN_PAIRS.save(deps.storage, (bridge_id, l2_denom.as_str()), &amount.denom)?;
    }

    info!(bridge_id, sequence, amount = %amount, "deposit initiated");

    Ok(response.add_event(
        Event::new("initiate_token_deposit")
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("l1_sequence", sequence.to_string())
            .add_attribute("from", info.sender)
            .add_attribute("to", to)
            .add_attribute("l1_denom", amount.denom)
            .add_attribute("l2_denom", l2_denom)
            .add_attribute("amount", amount.amount.to_string())
            .add_attribute("data", hex::encode(data.as_slice())),
    ))
}

fn forward_deposit(
    deps: HostDeps,
    env: &Env,
    info: &MessageInfo,
    migration: &MigrationInfo,
    to: &str,
    amount: &Coin,
    data: &Binary,
) -> Result<Vec<Event>, HostError> {
    let msg = TransferMsg {
        source_port: migration.ibc_port_id.clone(),
        source_channel: migration.ibc_channel_id.clone(),
        token: amount.clone(),
        sender: info.sender.to_string(),
        receiver: to.to_string(),
        timeout_timestamp: env.block.time.plus_seconds(FORWARD_TIMEOUT_SECONDS).nanos(),
        memo: forward_memo(data),
    };
    Ok(deps.transfer.transfer(deps.storage, env, msg)?)
}

/// Memo of a forwarded deposit: `{"opinit": <data>}` when hook data is present.
///
/// Data that is valid JSON is embedded as is, anything else as a string.
pub fn forward_memo(data: &[u8]) -> String {
    if data.is_empty() {
        return FORWARDED_MEMO.to_string();
    }
    let value = serde_json::from_slice::<serde_json::Value>(data)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(data).into_owned()));
    serde_json::json!({ "opinit": value }).to_string()
}
