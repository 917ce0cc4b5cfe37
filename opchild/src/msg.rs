//! Message types for the OPinit child bridge
//!
//! The transaction signer is always `info.sender`: a bridge executor for
//! `Deposit` and `SetBridgeInfo`, the module authority for validator and
//! params changes, and any account for `Withdraw`.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Coin};

use crate::state::{BridgeInfo, DenomPair, MigrationInfo, Params, Validator};

// ============================================================================
// Instantiate
// ============================================================================

#[cw_serde]
pub struct InstantiateMsg {
    /// Module authority
    pub authority: String,
    pub params: Params,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Authority
    // ========================================================================
    /// Run authority messages on behalf of the module authority
    ///
    /// Authorization: params admin
    ExecuteMessages { messages: Vec<ExecuteMsg> },

    /// Authorization: authority
    AddValidator {
        moniker: String,
        operator_address: String,
        /// 32-byte ed25519 key
        consensus_pubkey: Binary,
    },

    /// Authorization: authority
    RemoveValidator { operator_address: String },

    /// Authorization: authority
    UpdateParams { params: Params },

    /// Map vouchers arriving over an IBC channel onto an L2 denom
    ///
    /// Authorization: authority
    RegisterMigrationInfo { migration_info: MigrationInfo },

    // ========================================================================
    // Bridge
    // ========================================================================
    /// Authorization: bridge executor
    SetBridgeInfo { bridge_info: BridgeInfo },

    /// Credit an L1 deposit
    ///
    /// Authorization: bridge executor
    Deposit(DepositMsg),

    /// Burn L2 coins and start a withdrawal to `to` on L1
    Withdraw { to: String, amount: Coin },
}

impl ExecuteMsg {
    /// Messages that only the module authority may send
    pub fn is_authority_message(&self) -> bool {
        matches!(
            self,
            ExecuteMsg::AddValidator { .. }
                | ExecuteMsg::RemoveValidator { .. }
                | ExecuteMsg::UpdateParams { .. }
                | ExecuteMsg::RegisterMigrationInfo { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExecuteMsg::ExecuteMessages { .. } => "execute_messages",
            ExecuteMsg::AddValidator { .. } => "add_validator",
            ExecuteMsg::RemoveValidator { .. } => "remove_validator",
            ExecuteMsg::UpdateParams { .. } => "update_params",
            ExecuteMsg::RegisterMigrationInfo { .. } => "register_migration_info",
            ExecuteMsg::SetBridgeInfo { .. } => "set_bridge_info",
            ExecuteMsg::Deposit(_) => "deposit",
            ExecuteMsg::Withdraw { .. } => "withdraw",
        }
    }
}

/// L1 deposit relayed by a bridge executor
#[cw_serde]
pub struct DepositMsg {
    /// L1 deposit sequence
    pub sequence: u64,
    /// L1 sender
    pub from: String,
    /// L2 receiver
    pub to: String,
    /// Coin in the L2 denom of `base_denom`
    pub amount: Coin,
    /// L1 denom
    pub base_denom: String,
    /// L1 height of the deposit
    pub height: u64,
    /// Passed to the deposit hook when present
    pub hook_msg: Option<Binary>,
}

// ============================================================================
// Execute Responses (set as response data)
// ============================================================================

#[cw_serde]
pub enum DepositResult {
    Success,
    /// The sequence was already credited
    Noop,
}

#[cw_serde]
pub struct DepositResponse {
    pub result: DepositResult,
}

#[cw_serde]
pub struct WithdrawResponse {
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

    #[returns(BridgeInfoResponse)]
    BridgeInfo {},

    #[returns(ValidatorResponse)]
    Validator { operator_address: String },

    #[returns(ValidatorsResponse)]
    Validators {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    #[returns(SequenceResponse)]
    NextL2Sequence {},

    #[returns(FinalizedSequenceResponse)]
    FinalizedL1Sequence { sequence: u64 },

    #[returns(DenomPairResponse)]
    DenomPair { denom: String },

    #[returns(MigrationInfoResponse)]
    MigrationInfo { denom: String },
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
pub struct BridgeInfoResponse {
    pub bridge_info: BridgeInfo,
}

#[cw_serde]
pub struct ValidatorResponse {
    pub validator: Validator,
}

#[cw_serde]
pub struct ValidatorsResponse {
    pub validators: Vec<Validator>,
}

#[cw_serde]
pub struct SequenceResponse {
    pub sequence: u64,
}

#[cw_serde]
pub struct FinalizedSequenceResponse {
    pub finalized: bool,
}

#[cw_serde]
pub struct DenomPairResponse {
    pub denom_pair: DenomPair,
}

#[cw_serde]
pub struct MigrationInfoResponse {
    pub migration_info: MigrationInfo,
    /// Voucher denom converted into `migration_info.denom`
    pub ibc_denom: String,
}
