//! Output ledger handlers.

use cosmwasm_std::{to_json_binary, Binary, Env, Event, MessageInfo, Response};
use opinit_common::hash::{bytes32_to_hex, to_bytes32};
use tracing::info;

use crate::deps::HostDeps;
use crate::error::HostError;
use crate::keeper::{is_finalized, load_bridge_config, load_output, next_output_index};
use crate::msg::ProposeOutputResponse;
use crate::state::{Output, NEXT_OUTPUT_INDEXES, OUTPUT_PROPOSALS};

/// Record an L2 batch for data availability.
///
/// The ledger keeps nothing; the event is the record.
pub fn execute_record_batch(
    deps: HostDeps,
    _env: Env,
    info: MessageInfo,
    bridge_id: u64,
    batch_bytes: Binary,
) -> Result<Response, HostError> {
    load_bridge_config(deps.storage, bridge_id)?;
    if batch_bytes.is_empty() {
        return Err(HostError::InvalidBatchInfo {
            reason: "batch bytes are empty".to_string(),
        });
    }

    Ok(Response::new().add_event(
        Event::new("record_batch")
            .add_attribute("submitter", info.sender)
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("batch_size", batch_bytes.len().to_string()),
    ))
}

pub fn execute_propose_output(
    deps: HostDeps,
    env: Env,
    info: MessageInfo,
    bridge_id: u64,
    output_index: u64,
    l2_block_number: u64,
    output_root: Binary,
) -> Result<Response, HostError> {
    let config = load_bridge_config(deps.storage, bridge_id)?;
    if info.sender != config.proposer {
        return Err(HostError::unauthorized(&info.sender));
    }
    if env.block.time < config.submission_start_time {
        return Err(HostError::SubmissionInterval {
            start_time: config.submission_start_time.to_string(),
        });
    }

    let output_root = to_bytes32(&output_root).map_err(|got| HostError::InvalidHashLength {
        field: "output_root".to_string(),
        got,
    })?;

    let expected = next_output_index(deps.storage, bridge_id)?;
    if output_index != expected {
        return Err(HostError::InvalidOutputIndex {
            expected,
            got: output_index,
        });
    }
    if expected > 1 {
        let last = load_output(deps.storage, bridge_id, expected - 1)?;
        if l2_block_number <= last.l2_block_number {
            return Err(HostError::InvalidL2BlockNumber {
                last: last.l2_block_number,
                got: l2_block_number,
            });
        }
    }

    let output = Output {
        output_root,
        l1_block_number: env.block.height,
        l1_block_time: env.block.time,
        l2_block_number,
    };
    OUTPUT_PROPOSALS.save(deps.storage, (bridge_id, output_index), &output)?;
    let next = output_index.checked_add(1).ok_or(HostError::Overflow)?;
    NEXT_OUTPUT_INDEXES.save(deps.storage, bridge_id, &next)?;

    info!(bridge_id, output_index, l2_block_number, "output proposed");

    Ok(Response::new()
        .set_data(to_json_binary(&ProposeOutputResponse { output_index })?)
        .add_event(
            Event::new("propose_output")
                .add_attribute("proposer", info.sender)
                .add_attribute("bridge_id", bridge_id.to_string())
                .add_attribute("output_index", output_index.to_string())
                .add_attribute("output_root", bytes32_to_hex(&output_root))
                .add_attribute("l2_block_number", l2_block_number.to_string())
                .add_attribute("l1_block_number", env.block.height.to_string()),
        ))
}

/// Delete `output_index` and everything proposed after it.
///
/// Refuses the whole range when any output in it is already finalized.
pub fn execute_delete_output(
    deps: HostDeps,
    env: Env,
    info: MessageInfo,
    bridge_id: u64,
    output_index: u64,
) -> Result<Response, HostError> {
    let config = load_bridge_config(deps.storage, bridge_id)?;
    if info.sender != config.challenger {
        return Err(HostError::unauthorized(&info.sender));
    }

    let next = next_output_index(deps.storage, bridge_id)?;
    if output_index == 0 || output_index >= next {
        return Err(HostError::OutputNotFound {
            bridge_id,
            output_index,
        });
    }

    for index in output_index..next {
        let output = load_output(deps.storage, bridge_id, index)?;
        if is_finalized(&config, &output, env.block.time) {
            return Err(HostError::AlreadyFinalized {
                bridge_id,
                output_index: index,
            });
        }
    }
    for index in output_index..next {
        OUTPUT_PROPOSALS.remove(deps.storage, (bridge_id, index));
    }
    NEXT_OUTPUT_INDEXES.save(deps.storage, bridge_id, &output_index)?;

    info!(
        bridge_id,
        output_index,
        deleted = next - output_index,
        "outputs deleted by challenger"
    );

    Ok(Response::new().add_event(
        Event::new("delete_output")
            .add_attribute("challenger", info.sender)
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("output_index", output_index.to_string())
            .add_attribute("deleted_count", (next - output_index).to_string()),
    ))
}
