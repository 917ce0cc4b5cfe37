//! Bridge handlers: deposit finalization and withdrawal initiation.

use cosmwasm_std::{to_json_binary, Coin, Env, Event, MessageInfo, Response};
use opinit_common::{address, l2_denom, withdrawal_hash, CacheStore};
use tracing::{debug, info, warn};

use crate::deps::ChildDeps;
use crate::error::ChildError;
use crate::keeper::{
    ensure_bridge_executor, has_finalized_l1_sequence, load_bridge_info, load_params,
    next_l2_sequence, record_finalized_l1_sequence,
};
use crate::msg::{DepositMsg, DepositResponse, DepositResult, WithdrawResponse};
use crate::state::{BridgeInfo, BRIDGE_INFO, DENOM_PAIRS};

pub fn execute_set_bridge_info(
    deps: ChildDeps,
    _env: Env,
    info: MessageInfo,
    bridge_info: BridgeInfo,
) -> Result<Response, ChildError> {
    ensure_bridge_executor(deps.storage, &info.sender)?;
    validate_bridge_info(&bridge_info)?;

    if let Some(current) = BRIDGE_INFO.may_load(deps.storage)? {
        if current.bridge_id != bridge_info.bridge_id {
            return Err(ChildError::BridgeInfoImmutable {
                current: current.bridge_id,
                got: bridge_info.bridge_id,
            });
        }
    }
    BRIDGE_INFO.save(deps.storage, &bridge_info)?;

    info!(bridge_id = bridge_info.bridge_id, l1_chain_id = %bridge_info.l1_chain_id, "bridge info set");

    Ok(Response::new().add_event(
        Event::new("set_bridge_info")
            .add_attribute("bridge_id", bridge_info.bridge_id.to_string())
            .add_attribute("bridge_addr", bridge_info.bridge_addr)
            .add_attribute("l1_chain_id", bridge_info.l1_chain_id)
            .add_attribute("l1_client_id", bridge_info.l1_client_id),
    ))
}

pub fn validate_bridge_info(bridge_info: &BridgeInfo) -> Result<(), ChildError> {
    if bridge_info.bridge_id == 0 {
        return Err(ChildError::InvalidBridgeInfo {
            reason: "bridge id must be positive".to_string(),
        });
    }
    for (field, value) in [
        ("bridge_addr", &bridge_info.bridge_addr),
        ("l1_chain_id", &bridge_info.l1_chain_id),
        ("l1_client_id", &bridge_info.l1_client_id),
    ] {
        if value.trim().is_empty() {
            return Err(ChildError::InvalidBridgeInfo {
                reason: format!("{} is empty", field),
            });
        }
    }
    Ok(())
}

// ============================================================================
// Deposit
// ============================================================================

/// Credit an L1 deposit exactly once.
///
/// A sequence that was already credited answers `Noop` and changes nothing.
pub fn execute_deposit(
    deps: ChildDeps,
    env: Env,
    info: MessageInfo,
    msg: DepositMsg,
) -> Result<Response, ChildError> {
    ensure_bridge_executor(deps.storage, &info.sender)?;
    let bridge_info = load_bridge_info(deps.storage)?;
    if msg.sequence == 0 {
        return Err(ChildError::InvalidSequence);
    }

    if has_finalized_l1_sequence(deps.storage, msg.sequence) {
        debug!(sequence = msg.sequence, "deposit already finalized");
        return Ok(Response::new()
            .set_data(to_json_binary(&DepositResponse {
                result: DepositResult::Noop,
            })?)
            .add_attribute("action", "deposit")
            .add_attribute("result", "noop"));
    }

    let expected = l2_denom(bridge_info.bridge_id, &msg.base_denom);
    if msg.amount.denom != expected {
        return Err(ChildError::InvalidDenom {
            denom: msg.amount.denom,
        });
    }
    let params = load_params(deps.storage)?;
    let receiver = address::validate(&params.bech32_prefix, &msg.to)?;

    record_finalized_l1_sequence(deps.storage, msg.sequence)?;
    if !msg.amount.amount.is_zero() {
        deps.bank
            .mint(deps.storage, &receiver, &[msg.amount.clone()])?;
    }
    if !DENOM_PAIRS.has(deps.storage, &msg.amount.denom) {
        DENOM_PAIRS.save(deps.storage, &msg.amount.denom, &msg.base_denom)?;
    }

    let mut hook_events = vec![];
    let mut success = true;
    let mut reason = String::new();
    if let Some(hook_msg) = msg.hook_msg.as_ref().filter(|hook_msg| !hook_msg.is_empty()) {
        let mut cache = CacheStore::new(deps.storage);
        match deps
            .deposit_hook
            .on_deposit(&mut cache, &env, &receiver, &msg.amount, hook_msg)
        {
            Ok(events) => {
                cache.commit();
                hook_events = events;
            }
            Err(err) => {
                warn!(sequence = msg.sequence, error = %err, "deposit hook failed");
                success = false;
                reason = err.to_string();
            }
        }
    }

    info!(sequence = msg.sequence, amount = %msg.amount, receiver = %receiver, "deposit finalized");

    Ok(Response::new()
        .set_data(to_json_binary(&DepositResponse {
            result: DepositResult::Success,
        })?)
        .add_event(
            Event::new("finalize_token_deposit")
                .add_attribute("l1_sequence", msg.sequence.to_string())
                .add_attribute("sender", msg.from)
                .add_attribute("recipient", receiver)
                .add_attribute("denom", msg.amount.denom)
                .add_attribute("base_denom", msg.base_denom)
                .add_attribute("amount", msg.amount.amount.to_string())
                .add_attribute("finalize_height", msg.height.to_string())
                .add_attribute("success", success.to_string())
                .add_attribute("reason", reason),
        )
        .add_events(hook_events))
}

// ============================================================================
// Withdraw
// ============================================================================

/// Burn `amount` from the signer and assign the next L2 sequence.
///
/// The emitted withdrawal hash is the leaf the host verifies against the
/// finalized output.
pub fn execute_withdraw(
    deps: ChildDeps,
    _env: Env,
    info: MessageInfo,
    to: String,
    amount: Coin,
) -> Result<Response, ChildError> {
    let bridge_info = load_bridge_info(deps.storage)?;
    let base_denom = DENOM_PAIRS
        .may_load(deps.storage, &amount.denom)?
        .ok_or_else(|| ChildError::TokenPairNotFound {
            denom: amount.denom.clone(),
        })?;
    if amount.amount.is_zero() {
        return Err(ChildError::InvalidAmount {
            reason: "amount must be positive".to_string(),
        });
    }
    let amount_u64 = u64::try_from(amount.amount.u128()).map_err(|_| ChildError::InvalidAmount {
        reason: format!("{} does not fit in 64 bits", amount.amount),
    })?;
    // `to` lives on L1, so any bech32 prefix is accepted
    address::decode(&to)?;

    deps.bank
        .burn(deps.storage, &info.sender, &[amount.clone()])?;
    let sequence = next_l2_sequence(deps.storage)?;
    let hash = withdrawal_hash(
        bridge_info.bridge_id,
        sequence,
        info.sender.as_str(),
        &to,
        &base_denom,
        amount_u64,
    );

    info!(sequence, amount = %amount, "withdrawal initiated");

    Ok(Response::new()
        .set_data(to_json_binary(&WithdrawResponse { sequence })?)
        .add_event(
            Event::new("initiate_token_withdrawal")
                .add_attribute("from", info.sender)
                .add_attribute("to", to)
                .add_attribute("denom", amount.denom)
                .add_attribute("base_denom", base_denom)
                .add_attribute("amount", amount.amount.to_string())
                .add_attribute("l2_sequence", sequence.to_string())
                .add_attribute("withdrawal_hash", hex::encode(hash)),
        ))
}
