//! State definitions for the OPinit host bridge
//!
//! This module defines all storage structures and state maps of the host
//! (L1) side: the bridge registry, the output ledger, deposit sequences,
//! token pairs, proven withdrawals, batch-info history, migration routes and
//! the oracle-price attestation.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Coin, Empty, Timestamp};
use cw_storage_plus::{Item, Map};

use opinit_common::address::DEFAULT_BECH32_PREFIX;

// ============================================================================
// Module Configuration
// ============================================================================

/// Module parameters, replaced through `UpdateParams`
#[cw_serde]
pub struct Params {
    /// Fee charged to the creator of a bridge, paid into the community pool
    pub registration_fee: Vec<Coin>,
    /// Bech32 prefix of L1 account addresses
    pub bech32_prefix: String,
    /// Relative timeout of attestor-set packets, in seconds
    pub attestor_packet_timeout: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            registration_fee: vec![],
            bech32_prefix: DEFAULT_BECH32_PREFIX.to_string(),
            attestor_packet_timeout: 600,
        }
    }
}

// ============================================================================
// Bridge Registry
// ============================================================================

/// Where and by whom L2 batches are submitted
#[cw_serde]
pub struct BatchInfo {
    /// Submitter address on the DA chain
    pub submitter: String,
    /// DA chain tag
    pub chain_type: String,
}

/// Attestor reported to the child chain through the attestor channel
#[cw_serde]
pub struct Attestor {
    pub operator_address: String,
    /// ed25519 consensus public key
    pub consensus_pubkey: Binary,
    pub moniker: String,
}

/// Per-bridge configuration
#[cw_serde]
pub struct BridgeConfig {
    /// Only account allowed to propose outputs
    pub proposer: Addr,
    /// Only account allowed to delete unfinalized outputs
    pub challenger: Addr,
    /// Expected time between two proposals, in seconds
    pub submission_interval: u64,
    /// Time an output stays challengeable, in seconds
    pub finalization_period: u64,
    /// Proposals are accepted from this time on
    pub submission_start_time: Timestamp,
    /// Opaque to the ledger; either empty or JSON `BridgeMetadata`
    #[serde(default)]
    pub metadata: Binary,
    pub batch_info: BatchInfo,
    #[serde(default)]
    pub oracle_enabled: bool,
    #[serde(default)]
    pub attestor_set: Vec<Attestor>,
}

/// IBC channel end listed in the bridge metadata
#[cw_serde]
pub struct PermissionedChannel {
    pub port_id: String,
    pub channel_id: String,
}

/// Structured form of `BridgeConfig::metadata`
#[cw_serde]
#[derive(Default)]
pub struct BridgeMetadata {
    #[serde(default)]
    pub perm_channels: Vec<PermissionedChannel>,
}

// ============================================================================
// Output Ledger
// ============================================================================

/// L2 state commitment submitted by the proposer
#[cw_serde]
#[derive(Default)]
pub struct Output {
    pub output_root: [u8; 32],
    /// L1 height at proposal
    pub l1_block_number: u64,
    /// L1 time at proposal, start of the finalization window
    pub l1_block_time: Timestamp,
    /// L2 height the root commits to
    pub l2_block_number: u64,
}

/// Batch-info history entry, pinned to the finalized output at update time
#[cw_serde]
pub struct BatchInfoWithOutput {
    pub batch_info: BatchInfo,
    /// 0 when no output was finalized yet
    pub output_index: u64,
    pub output: Output,
}

/// IBC route replacing local escrow for one L1 denom
#[cw_serde]
pub struct MigrationInfo {
    pub l1_denom: String,
    pub ibc_port_id: String,
    pub ibc_channel_id: String,
}

/// Latest oracle-price commitment
#[cw_serde]
pub struct OraclePriceHash {
    pub hash: [u8; 32],
    pub l1_block_height: u64,
    pub l1_block_time_ns: u64,
}

// ============================================================================
// Constants
// ============================================================================

/// Contract name for cw2 version info
pub const CONTRACT_NAME: &str = "crates.io:ophost";

/// Contract version for cw2 version info
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// First value of every sequence and index counter
pub const INITIAL_SEQUENCE: u64 = 1;

// ============================================================================
// Storage
// ============================================================================

/// Governance account allowed to change params and override bridge roles
pub const AUTHORITY: Item<Addr> = Item::new("authority");

pub const PARAMS: Item<Params> = Item::new("params");

pub const NEXT_BRIDGE_ID: Item<u64> = Item::new("next_bridge_id");

/// Key: bridge_id
pub const BRIDGE_CONFIGS: Map<u64, BridgeConfig> = Map::new("bridge_configs");

/// Key: bridge_id, Value: next deposit sequence
pub const NEXT_L1_SEQUENCES: Map<u64, u64> = Map::new("next_l1_sequences");

/// Key: bridge_id, Value: next expected output index
pub const NEXT_OUTPUT_INDEXES: Map<u64, u64> = Map::new("next_output_indexes");

/// Key: (bridge_id, output_index)
pub const OUTPUT_PROPOSALS: Map<(u64, u64), Output> = Map::new("output_proposals");

/// Key: (bridge_id, l2_denom), Value: l1_denom
pub const TOKEN_PAIRS: Map<(u64, &str), String> = Map::new("token_pairs");

/// Key: (bridge_id, withdrawal_hash); presence means settled
pub const PROVEN_WITHDRAWALS: Map<(u64, &[u8]), Empty> = Map::new("proven_withdrawals");

/// Key: (bridge_id, position)
pub const BATCH_INFOS: Map<(u64, u64), BatchInfoWithOutput> = Map::new("batch_infos");

/// Key: (bridge_id, l1_denom)
pub const MIGRATION_INFOS: Map<(u64, &str), MigrationInfo> = Map::new("migration_infos");

pub const ORACLE_PRICE_HASH: Item<OraclePriceHash> = Item::new("oracle_price_hash");
