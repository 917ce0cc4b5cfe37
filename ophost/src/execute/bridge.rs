//! Bridge registry handlers.
//!
//! - `CreateBridge` - allocate an id, store the config, open the batch history
//! - `UpdateProposer` / `UpdateChallenger` - rotate bridge roles
//! - `UpdateBatchInfo` / `UpdateMetadata` / `UpdateOracleConfig` - config updates
//! - `UpdateAttestorSet` - replace the attestor roster and ship it to L2

use cosmwasm_std::{to_json_binary, Env, Event, MessageInfo, Order, Response, StdResult, Storage};
use opinit_common::address;
use tracing::info;

use crate::deps::HostDeps;
use crate::error::HostError;
use crate::keeper::{
    ensure_authority_or, last_finalized_output, load_bridge_config, load_params, parse_metadata,
    validate_batch_info_fields, validate_bridge_config,
};
use crate::msg::{AttestorSetPacketData, CreateBridgeResponse};
use crate::state::{
    Attestor, BatchInfo, BatchInfoWithOutput, BridgeConfig, Output, BATCH_INFOS, BRIDGE_CONFIGS,
    INITIAL_SEQUENCE, NEXT_BRIDGE_ID, NEXT_L1_SEQUENCES, NEXT_OUTPUT_INDEXES,
};

/// Execute handler for registering a new bridge.
pub fn execute_create_bridge(
    deps: HostDeps,
    _env: Env,
    info: MessageInfo,
    config: BridgeConfig,
) -> Result<Response, HostError> {
    let params = load_params(deps.storage)?;
    let config = validate_bridge_config(&params.bech32_prefix, &config)?;

    if !params.registration_fee.is_empty() {
        let community_pool = address::community_pool_address(&params.bech32_prefix)?;
        deps.bank.send(
            deps.storage,
            &info.sender,
            &community_pool,
            &params.registration_fee,
        )?;
    }

    let bridge_id = NEXT_BRIDGE_ID.load(deps.storage)?;
    let next_bridge_id = bridge_id.checked_add(1).ok_or(HostError::Overflow)?;
    NEXT_BRIDGE_ID.save(deps.storage, &next_bridge_id)?;

    BRIDGE_CONFIGS.save(deps.storage, bridge_id, &config)?;
    NEXT_L1_SEQUENCES.save(deps.storage, bridge_id, &INITIAL_SEQUENCE)?;
    NEXT_OUTPUT_INDEXES.save(deps.storage, bridge_id, &INITIAL_SEQUENCE)?;
    append_batch_info(
        deps.storage,
        bridge_id,
        &BatchInfoWithOutput {
            batch_info: config.batch_info.clone(),
            output_index: 0,
            output: Output::default(),
        },
    )?;

    let bridge_addr = address::bridge_address(&params.bech32_prefix, bridge_id)?;
    deps.hooks.bridge_created(deps.storage, bridge_id, &config)?;

    info!(
        bridge_id,
        proposer = %config.proposer,
        challenger = %config.challenger,
        "bridge created"
    );

    Ok(Response::new()
        .set_data(to_json_binary(&CreateBridgeResponse { bridge_id })?)
        .add_event(
            Event::new("create_bridge")
                .add_attribute("creator", info.sender)
                .add_attribute("bridge_id", bridge_id.to_string())
                .add_attribute("bridge_addr", bridge_addr)
                .add_attribute("proposer", config.proposer)
                .add_attribute("challenger", config.challenger)
                .add_attribute("batch_chain_type", config.batch_info.chain_type)
                .add_attribute("batch_submitter", config.batch_info.submitter),
        ))
}

/// Execute handler for replacing the proposer (authority or current proposer).
pub fn execute_update_proposer(
    deps: HostDeps,
    env: Env,
    info: MessageInfo,
    bridge_id: u64,
    new_proposer: String,
) -> Result<Response, HostError> {
    let params = load_params(deps.storage)?;
    let mut config = load_bridge_config(deps.storage, bridge_id)?;
    ensure_authority_or(deps.storage, &info.sender, &config.proposer)?;

    config.proposer = address::validate(&params.bech32_prefix, &new_proposer)?;
    BRIDGE_CONFIGS.save(deps.storage, bridge_id, &config)?;
    deps.hooks
        .bridge_proposer_updated(deps.storage, bridge_id, &config.proposer)?;

    let (finalized_index, finalized_l2_block) =
        finalized_position(deps.storage, bridge_id, &config, &env)?;

    info!(bridge_id, proposer = %config.proposer, "proposer updated");

    Ok(Response::new().add_event(
        Event::new("update_proposer")
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("proposer", config.proposer)
            .add_attribute("finalized_output_index", finalized_index.to_string())
            .add_attribute("finalized_l2_block_number", finalized_l2_block.to_string()),
    ))
}

/// Execute handler for replacing the challenger (authority or current challenger).
pub fn execute_update_challenger(
    deps: HostDeps,
    _env: Env,
    info: MessageInfo,
    bridge_id: u64,
    new_challenger: String,
) -> Result<Response, HostError> {
    let params = load_params(deps.storage)?;
    let mut config = load_bridge_config(deps.storage, bridge_id)?;
    ensure_authority_or(deps.storage, &info.sender, &config.challenger)?;

    config.challenger = address::validate(&params.bech32_prefix, &new_challenger)?;
    BRIDGE_CONFIGS.save(deps.storage, bridge_id, &config)?;
    deps.hooks
        .bridge_challenger_updated(deps.storage, bridge_id, &config.challenger)?;

    info!(bridge_id, challenger = %config.challenger, "challenger updated");

    Ok(Response::new().add_event(
        Event::new("update_challenger")
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("challenger", config.challenger),
    ))
}

/// Execute handler for switching the batch submission target.
///
/// The history entry is pinned to the last finalized output, so executors
/// know from which L2 height the new target applies.
pub fn execute_update_batch_info(
    deps: HostDeps,
    env: Env,
    info: MessageInfo,
    bridge_id: u64,
    new_batch_info: BatchInfo,
) -> Result<Response, HostError> {
    let mut config = load_bridge_config(deps.storage, bridge_id)?;
    ensure_authority_or(deps.storage, &info.sender, &config.proposer)?;
    validate_batch_info_fields(&new_batch_info.submitter, &new_batch_info.chain_type)?;

    config.batch_info = new_batch_info;
    BRIDGE_CONFIGS.save(deps.storage, bridge_id, &config)?;

    let (output_index, output) = last_finalized_output(deps.storage, bridge_id, &config, env.block.time)?
        .unwrap_or_default();
    append_batch_info(
        deps.storage,
        bridge_id,
        &BatchInfoWithOutput {
            batch_info: config.batch_info.clone(),
            output_index,
            output: output.clone(),
        },
    )?;
    deps.hooks
        .bridge_batch_info_updated(deps.storage, bridge_id, &config.batch_info)?;

    Ok(Response::new().add_event(
        Event::new("update_batch_info")
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("batch_chain_type", config.batch_info.chain_type)
            .add_attribute("batch_submitter", config.batch_info.submitter)
            .add_attribute("finalized_output_index", output_index.to_string())
            .add_attribute("finalized_l2_block_number", output.l2_block_number.to_string()),
    ))
}

/// Execute handler for replacing the bridge metadata.
pub fn execute_update_metadata(
    deps: HostDeps,
    _env: Env,
    info: MessageInfo,
    bridge_id: u64,
    metadata: cosmwasm_std::Binary,
) -> Result<Response, HostError> {
    let mut config = load_bridge_config(deps.storage, bridge_id)?;
    ensure_authority_or(deps.storage, &info.sender, &config.proposer)?;
    parse_metadata(&metadata)?;

    config.metadata = metadata;
    BRIDGE_CONFIGS.save(deps.storage, bridge_id, &config)?;
    deps.hooks
        .bridge_metadata_updated(deps.storage, bridge_id, &config)?;

    Ok(Response::new().add_event(
        Event::new("update_metadata").add_attribute("bridge_id", bridge_id.to_string()),
    ))
}

/// Execute handler for toggling oracle relay on the child chain.
pub fn execute_update_oracle_config(
    deps: HostDeps,
    _env: Env,
    info: MessageInfo,
    bridge_id: u64,
    oracle_enabled: bool,
) -> Result<Response, HostError> {
    let mut config = load_bridge_config(deps.storage, bridge_id)?;
    ensure_authority_or(deps.storage, &info.sender, &config.proposer)?;

    config.oracle_enabled = oracle_enabled;
    BRIDGE_CONFIGS.save(deps.storage, bridge_id, &config)?;

    Ok(Response::new().add_event(
        Event::new("update_oracle")
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("oracle_enabled", oracle_enabled.to_string()),
    ))
}

/// Execute handler for replacing the attestor roster.
///
/// The roster is sent over the first permissioned channel of the bridge
/// metadata.
pub fn execute_update_attestor_set(
    deps: HostDeps,
    env: Env,
    info: MessageInfo,
    bridge_id: u64,
    attestor_set: Vec<Attestor>,
) -> Result<Response, HostError> {
    let params = load_params(deps.storage)?;
    let mut config = load_bridge_config(deps.storage, bridge_id)?;
    ensure_authority_or(deps.storage, &info.sender, &config.proposer)?;

    for attestor in &attestor_set {
        if attestor.consensus_pubkey.len() != 32 {
            return Err(HostError::InvalidBridgeConfig {
                reason: format!(
                    "attestor {} has a {}-byte consensus key",
                    attestor.operator_address,
                    attestor.consensus_pubkey.len()
                ),
            });
        }
    }

    let metadata = parse_metadata(&config.metadata)?;
    let channel = metadata
        .perm_channels
        .first()
        .ok_or(HostError::AttestorChannelNotFound { bridge_id })?;
    let capability = deps
        .channels
        .get_capability(deps.storage, &channel.port_id, &channel.channel_id)
        .ok_or(HostError::AttestorChannelNotFound { bridge_id })?;
    deps.channels
        .next_sequence_send(deps.storage, &channel.port_id, &channel.channel_id)
        .ok_or(HostError::AttestorChannelNotFound { bridge_id })?;

    config.attestor_set = attestor_set;
    BRIDGE_CONFIGS.save(deps.storage, bridge_id, &config)?;

    let packet = AttestorSetPacketData {
        bridge_id,
        attestor_set: config.attestor_set.clone(),
        l1_block_height: env.block.height,
    };
    let timeout = env
        .block
        .time
        .plus_seconds(params.attestor_packet_timeout)
        .nanos();
    let sequence = deps.channels.send_packet(
        deps.storage,
        &capability,
        &channel.port_id,
        &channel.channel_id,
        timeout,
        to_json_binary(&packet)?,
    )?;

    info!(
        bridge_id,
        sequence,
        attestors = config.attestor_set.len(),
        "attestor set packet sent"
    );

    Ok(Response::new().add_event(
        Event::new("attestor_set_packet_sent")
            .add_attribute("bridge_id", bridge_id.to_string())
            .add_attribute("port_id", &channel.port_id)
            .add_attribute("channel_id", &channel.channel_id)
            .add_attribute("sequence", sequence.to_string())
            .add_attribute("attestor_count", config.attestor_set.len().to_string()),
    ))
}

/// Append an entry to the batch-info history of a bridge.
pub(crate) fn append_batch_info(
    store: &mut dyn Storage,
    bridge_id: u64,
    entry: &BatchInfoWithOutput,
) -> StdResult<()> {
    let position = BATCH_INFOS
        .prefix(bridge_id)
        .keys(store, None, None, Order::Descending)
        .next()
        .transpose()?
        .map_or(0, |last| last + 1);
    BATCH_INFOS.save(store, (bridge_id, position), entry)
}

fn finalized_position(
    store: &dyn Storage,
    bridge_id: u64,
    config: &BridgeConfig,
    env: &Env,
) -> StdResult<(u64, u64)> {
    Ok(last_finalized_output(store, bridge_id, config, env.block.time)?
        .map_or((0, 0), |(index, output)| (index, output.l2_block_number)))
}
