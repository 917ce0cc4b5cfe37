//! Message types for the OPinit host bridge
//!
//! The transaction signer is always `info.sender`: the proposer for
//! `ProposeOutput`, the challenger for `DeleteOutput`, the governance
//! authority for `UpdateParams`, and so on.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Coin, Timestamp};

use crate::state::{Attestor, BatchInfo, BatchInfoWithOutput, BridgeConfig, MigrationInfo, Params};

// ============================================================================
// Instantiate
// ============================================================================

#[cw_serde]
pub struct InstantiateMsg {
    /// Governance account
    pub authority: String,
    /// Defaults to `Params::default()`
    pub params: Option<Params>,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Bridge Registry
    // ========================================================================
    /// Register a new bridge; the signer pays the registration fee
    CreateBridge { config: BridgeConfig },

    /// Authorization: authority or current proposer
    UpdateProposer { bridge_id: u64, new_proposer: String },

    /// Authorization: authority or current challenger
    UpdateChallenger { bridge_id: u64, new_challenger: String },

    /// Authorization: authority or current proposer
    UpdateBatchInfo {
        bridge_id: u64,
        new_batch_info: BatchInfo,
    },

    /// Authorization: authority or current proposer
    UpdateMetadata { bridge_id: u64, metadata: Binary },

    /// Authorization: authority or current proposer
    UpdateOracleConfig { bridge_id: u64, oracle_enabled: bool },

    /// Replace the attestor roster and ship it to L2 over the attestor channel
    ///
    /// Authorization: authority or current proposer
    UpdateAttestorSet {
        bridge_id: u64,
        attestor_set: Vec<Attestor>,
    },

    // ========================================================================
    // Output Ledger
    // ========================================================================
    /// Record an L2 batch for DA; the ledger only emits it
    RecordBatch { bridge_id: u64, batch_bytes: Binary },

    /// Authorization: bridge proposer
    ProposeOutput {
        bridge_id: u64,
        output_index: u64,
        l2_block_number: u64,
        /// 32 bytes
        output_root: Binary,
    },

    /// Delete `output_index` and every later output, if none is finalized
    ///
    /// Authorization: bridge challenger
    DeleteOutput { bridge_id: u64, output_index: u64 },

    // ========================================================================
    // Token Flow
    // ========================================================================
    /// Escrow `amount` from the signer for `to` on L2
    InitiateTokenDeposit {
        bridge_id: u64,
        to: String,
        amount: Coin,
        data: Option<Binary>,
    },

    /// Release escrowed coins against a proof of inclusion in a finalized output
    FinalizeTokenWithdrawal(FinalizeTokenWithdrawalMsg),

    // ========================================================================
    // Governance
    // ========================================================================
    /// Authorization: authority
    UpdateParams { params: Params },

    /// Route future deposits of `migration_info.l1_denom` through IBC
    ///
    /// Authorization: authority
    RegisterMigrationInfo {
        bridge_id: u64,
        migration_info: MigrationInfo,
    },
}

/// Withdrawal claim with its inclusion proof
#[cw_serde]
pub struct FinalizeTokenWithdrawalMsg {
    pub bridge_id: u64,
    pub output_index: u64,
    /// L2 withdrawal sequence
    pub sequence: u64,
    /// 32-byte Merkle siblings, leaf to root
    pub withdrawal_proofs: Vec<Binary>,
    /// L2 sender
    pub from: String,
    /// L1 receiver
    pub to: String,
    pub amount: Coin,
    pub version: Binary,
    pub state_root: Binary,
    pub storage_root: Binary,
    pub last_block_hash: Binary,
}

// ============================================================================
// Execute Responses (set as response data)
// ============================================================================

#[cw_serde]
pub struct CreateBridgeResponse {
    pub bridge_id: u64,
}

#[cw_serde]
pub struct ProposeOutputResponse {
    pub output_index: u64,
}

#[cw_serde]
pub struct InitiateTokenDepositResponse {
    pub sequence: u64,
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ParamsResponse)]
    Params {},

    #[returns(BridgeResponse)]
    Bridge { bridge_id: u64 },

    #[returns(BridgesResponse)]
    Bridges {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(OutputProposalResponse)]
    OutputProposal { bridge_id: u64, output_index: u64 },

    #[returns(OutputProposalsResponse)]
    OutputProposals {
        bridge_id: u64,
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    #[returns(Option<OutputProposalResponse>)]
    LastFinalizedOutput { bridge_id: u64 },

    #[returns(SequenceResponse)]
    NextL1Sequence { bridge_id: u64 },

    #[returns(OutputIndexResponse)]
    NextOutputIndex { bridge_id: u64 },

    #[returns(TokenPairResponse)]
    TokenPairByL1Denom { bridge_id: u64, l1_denom: String },

    #[returns(TokenPairResponse)]
    TokenPairByL2Denom { bridge_id: u64, l2_denom: String },

    #[returns(TokenPairsResponse)]
    TokenPairs {
        bridge_id: u64,
        start_after: Option<String>,
        limit: Option<u32>,
    },

    #[returns(BatchInfosResponse)]
    BatchInfos { bridge_id: u64 },

    #[returns(ProvenWithdrawalResponse)]
    ProvenWithdrawal {
        bridge_id: u64,
        withdrawal_hash: Binary,
    },

    #[returns(MigrationInfoResponse)]
    MigrationInfo { bridge_id: u64, l1_denom: String },

    #[returns(Option<OraclePriceHashResponse>)]
    OraclePriceHash {},
}

// ============================================================================
// Query Responses
// ============================================================================

#[cw_serde]
pub struct ParamsResponse {
    pub authority: Addr,
    pub params: Params,
}

#[cw_serde]
pub struct BridgeResponse {
    pub bridge_id: u64,
    /// Escrow account of the bridge
    pub bridge_addr: Addr,
    pub bridge_config: BridgeConfig,
}

#[cw_serde]
pub struct BridgesResponse {
    pub bridges: Vec<BridgeResponse>,
}

#[cw_serde]
pub struct OutputProposalResponse {
    pub bridge_id: u64,
    pub output_index: u64,
    pub output_root: Binary,
    pub l1_block_number: u64,
    pub l1_block_time: Timestamp,
    pub l2_block_number: u64,
    pub finalized: bool,
}

#[cw_serde]
pub struct OutputProposalsResponse {
    pub outputs: Vec<OutputProposalResponse>,
}

#[cw_serde]
pub struct SequenceResponse {
    pub bridge_id: u64,
    pub sequence: u64,
}

#[cw_serde]
pub struct OutputIndexResponse {
    pub bridge_id: u64,
    pub output_index: u64,
}

#[cw_serde]
pub struct TokenPairResponse {
    pub l1_denom: String,
    pub l2_denom: String,
}

#[cw_serde]
pub struct TokenPairsResponse {
    pub token_pairs: Vec<TokenPairResponse>,
}

#[cw_serde]
pub struct BatchInfosResponse {
    pub batch_infos: Vec<BatchInfoWithOutput>,
}

#[cw_serde]
pub struct ProvenWithdrawalResponse {
    pub proven: bool,
}

#[cw_serde]
pub struct MigrationInfoResponse {
    pub migration_info: MigrationInfo,
}

#[cw_serde]
pub struct OraclePriceHashResponse {
    pub hash: Binary,
    pub l1_block_height: u64,
    pub l1_block_time_ns: u64,
}

// ============================================================================
// Packets
// ============================================================================

/// Payload of the packet sent by `UpdateAttestorSet`
#[cw_serde]
pub struct AttestorSetPacketData {
    pub bridge_id: u64,
    pub attestor_set: Vec<Attestor>,
    /// L1 height the roster was set at
    pub l1_block_height: u64,
}
