//! Withdrawal verifier: L2 to L1 token flow.
//!
//! A withdrawal is paid out once the claimed leaf folds up to the storage
//! root of a finalized output:
//!
//! ```text
//! output_root == SHA3(version[0] || storage_root || last_block_hash)
//! fold(withdrawal_hash, proofs) == storage_root
//! ```

use cosmwasm_std::{Binary, Empty, Env, Event, MessageInfo, Response};
use opinit_common::hash::{bytes32_to_hex, compute_merkle_root, to_bytes32};
use opinit_common::{address, l2_denom, output_root, withdrawal_hash};
use tracing::info;

use crate::deps::HostDeps;
use crate::error::HostError;
use crate::keeper::{ensure_bridge_id, is_finalized, load_bridge_config, load_output, load_params};
use crate::msg::FinalizeTokenWithdrawalMsg;
use crate::state::PROVEN_WITHDRAWALS;

fn hash_field(field: &str, bytes: &Binary) -> Result<[u8; 32], HostError> {
    to_bytes32(bytes).map_err(|got| HostError::InvalidHashLength {
        field: field.to_string(),
        got,
    })
}

pub fn execute_finalize_token_withdrawal(
    deps: HostDeps,
    env: Env,
    _info: MessageInfo,
    msg: FinalizeTokenWithdrawalMsg,
) -> Result<Response, HostError> {
    let params = load_params(deps.storage)?;

    // Stateless checks first
    ensure_bridge_id(msg.bridge_id)?;
    if msg.output_index == 0 {
        return Err(HostError::InvalidOutputIndex {
            expected: 1,
            got: 0,
        });
    }
    if msg.sequence == 0 {
        return Err(HostError::InvalidSequence);
    }
    address::decode(&msg.from)?;
    let receiver = address::validate(&params.bech32_prefix, &msg.to)?;
    if msg.amount.denom.trim().is_empty() {
        return Err(HostError::InvalidAmount {
            reason: "denom is empty".to_string(),
        });
    }
    if msg.amount.amount.is_zero() {
        return Err(HostError::InvalidAmount {
            reason: "amount must be positive".to_string(),
        });
    }
    let amount = u64::try_from(msg.amount.amount.u128()).map_err(|_| HostError::InvalidAmount {
        reason: "amount exceeds u64".to_string(),
    })?;

    let proofs = msg
        .withdrawal_proofs
        .iter()
        .map(|proof| hash_field("withdrawal_proofs", proof))
        .collect::<Result<Vec<_>, _>>()?;
    let version = hash_field("version", &msg.version)?;
    hash_field("state_root", &msg.state_root)?;
    let storage_root = hash_field("storage_root", &msg.storage_root)?;
    let last_block_hash = hash_field("last_block_hash", &msg.last_block_hash)?;

    let bridge_id = msg.bridge_id;
    let config = load_bridge_config(deps.storage, bridge_id)?;
    let output = load_output(deps.storage, bridge_id, msg.output_index)?;
    if !is_finalized(&config, &output, env.block.time) {
        return Err(HostError::NotFinalized {
            bridge_id,
            output_index: msg.output_index,
        });
    }

    if output_root(version[0], &storage_root, &last_block_hash) != output.output_root {
        return Err(HostError::FailedToVerifyWithdrawal {
            reason: "invalid output root".to_string(),
        });
    }

    let hash = withdrawal_hash(
        bridge_id,
        msg.sequence,
        &msg.from,
        &msg.to,
        &msg.amount.denom,
        amount,
    );
    if PROVEN_WITHDRAWALS.has(deps.storage, (bridge_id, hash.as_slice())) {
        return Err(HostError::WithdrawalAlreadyFinalized);
    }
    if compute_merkle_root(hash, &proofs) != storage_root {
        return Err(HostError::FailedToVerifyWithdrawal {
            reason: "invalid storage root proofs".to_string(),
        });
    }

    PROVEN_WITHDRAWALS.save(deps.storage, (bridge_id, hash.as_slice()), &Empty {})?;

    let bridge_addr = address::bridge_address(&params.bech32_prefix, bridge_id)?;
    deps.bank
        .send(deps.storage, &bridge_addr, &receiver, &[msg.amount.clone()])?;

    info!(
        bridge_id,
        output_index = msg.output_index,
        sequence = msg.sequence,
        receiver = %receiver,
        "withdrawal finalized"
    );

    Ok(Response::new().add_event(
        Event::new("finalize_token_withdrawal")
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("output_index", msg.output_index.to_string())
            .add_attribute("l2_sequence", msg.sequence.to_string())
            .add_attribute("from", msg.from)
            .add_attribute("to", msg.to)
            .add_attribute("l1_denom", &msg.amount.denom)
            .add_attribute("l2_denom", l2_denom(bridge_id, &msg.amount.denom))
            .add_attribute("amount", msg.amount.amount.to_string())
            .add_attribute("withdrawal_hash", bytes32_to_hex(&hash)),
    ))
}
