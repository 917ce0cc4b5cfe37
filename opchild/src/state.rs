//! State definitions for the OPinit child bridge
//!
//! The child (L2) side keeps the deposit dedup set, the withdrawal sequence
//! counter, the validator set surfaced to consensus, and the denom tables
//! used to mint deposits and convert migrated IBC vouchers.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Empty};
use cw_storage_plus::{Item, Map};

// ============================================================================
// Module Configuration
// ============================================================================

#[cw_serde]
pub struct Params {
    /// Accounts allowed to finalize deposits and set the bridge info
    pub bridge_executors: Vec<Addr>,
    /// Account allowed to run authority messages through `ExecuteMessages`
    pub admin: Addr,
    /// Upper bound of the active validator set
    pub max_validators: u32,
    /// Bech32 prefix of L2 account addresses
    pub bech32_prefix: String,
}

/// Host-side identity of the bridge this chain settles to
#[cw_serde]
pub struct BridgeInfo {
    pub bridge_id: u64,
    /// Escrow account of the bridge on L1
    pub bridge_addr: String,
    pub l1_chain_id: String,
    pub l1_client_id: String,
}

// ============================================================================
// Validators
// ============================================================================

#[cw_serde]
pub struct Validator {
    pub operator_address: Addr,
    /// ed25519 public key
    pub consensus_pubkey: Binary,
    pub moniker: String,
    /// 0 marks a validator that leaves the set at the next end block
    pub consensus_power: u64,
}

/// Power change reported to the consensus engine; power 0 removes
#[cw_serde]
pub struct ValidatorUpdate {
    pub pubkey: Binary,
    pub power: u64,
}

// ============================================================================
// Denoms
// ============================================================================

/// L2 denom minted for an L1 base denom
#[cw_serde]
pub struct DenomPair {
    pub denom: String,
    pub base_denom: String,
}

/// IBC channel end whose vouchers convert into an L2 denom
#[cw_serde]
pub struct MigrationInfo {
    /// L2 denom
    pub denom: String,
    pub ibc_port_id: String,
    pub ibc_channel_id: String,
}

// ============================================================================
// Constants
// ============================================================================

/// Contract name for cw2 version info
pub const CONTRACT_NAME: &str = "crates.io:opchild";

/// Contract version for cw2 version info
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// First outbound sequence
pub const INITIAL_SEQUENCE: u64 = 1;

/// Power assigned to validators added by the authority
pub const DEFAULT_CONSENSUS_POWER: u64 = 1;

// ============================================================================
// Storage
// ============================================================================

/// Module authority, the signer of authority messages
pub const AUTHORITY: Item<Addr> = Item::new("authority");

pub const PARAMS: Item<Params> = Item::new("params");

pub const BRIDGE_INFO: Item<BridgeInfo> = Item::new("bridge_info");

/// Key: L1 deposit sequence; presence means credited
pub const FINALIZED_L1_SEQUENCES: Map<u64, Empty> = Map::new("finalized_l1_sequences");

pub const NEXT_L2_SEQUENCE: Item<u64> = Item::new("next_l2_sequence");

/// Key: operator address
pub const VALIDATORS: Map<&Addr, Validator> = Map::new("validators");

/// Key: consensus address, Value: operator address
pub const VALIDATORS_BY_CONS_ADDR: Map<&[u8], Addr> = Map::new("validators_by_cons_addr");

/// Powers applied at the last end block; key: operator address
pub const LAST_VALIDATOR_POWERS: Map<&Addr, u64> = Map::new("last_validator_powers");

/// Key: L2 denom, Value: L1 base denom
pub const DENOM_PAIRS: Map<&str, String> = Map::new("denom_pairs");

/// Key: L2 denom
pub const MIGRATION_INFOS: Map<&str, MigrationInfo> = Map::new("migration_infos");

/// Key: IBC voucher denom, Value: L2 denom
pub const IBC_TO_L2_DENOMS: Map<&str, String> = Map::new("ibc_to_l2_denoms");
