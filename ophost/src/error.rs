//! Error types for the OPinit host bridge

use cosmwasm_std::StdError;
use opinit_common::{AddressError, BankError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum HostError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Bank(#[from] BankError),

    #[error("{0}")]
    Address(#[from] AddressError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: {signer} may not perform this action")]
    Unauthorized { signer: String },

    // ========================================================================
    // Lookup Errors
    // ========================================================================

    #[error("Bridge not found: {bridge_id}")]
    BridgeNotFound { bridge_id: u64 },

    #[error("Output not found: bridge {bridge_id}, index {output_index}")]
    OutputNotFound { bridge_id: u64, output_index: u64 },

    #[error("Token pair not found: bridge {bridge_id}, denom {denom}")]
    TokenPairNotFound { bridge_id: u64, denom: String },

    #[error("Attestor channel not found for bridge {bridge_id}")]
    AttestorChannelNotFound { bridge_id: u64 },

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Invalid bridge id")]
    InvalidBridgeId,

    #[error("Invalid {field} length: expected 32 bytes, got {got}")]
    InvalidHashLength { field: String, got: usize },

    #[error("Invalid output index: expected {expected}, got {got}")]
    InvalidOutputIndex { expected: u64, got: u64 },

    #[error("Invalid L2 block number: must exceed {last}, got {got}")]
    InvalidL2BlockNumber { last: u64, got: u64 },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid sequence")]
    InvalidSequence,

    #[error("Invalid batch info: {reason}")]
    InvalidBatchInfo { reason: String },

    #[error("Empty batch info")]
    EmptyBatchInfo,

    #[error("Invalid bridge metadata: {reason}")]
    InvalidBridgeMetadata { reason: String },

    #[error("Invalid bridge config: {reason}")]
    InvalidBridgeConfig { reason: String },

    #[error("Invalid migration info: {reason}")]
    InvalidMigrationInfo { reason: String },

    #[error("Invalid params: {reason}")]
    InvalidParams { reason: String },

    // ========================================================================
    // Output Lifecycle Errors
    // ========================================================================

    #[error("Submission interval: proposals open at {start_time}")]
    SubmissionInterval { start_time: String },

    #[error("Output not finalized: bridge {bridge_id}, index {output_index}")]
    NotFinalized { bridge_id: u64, output_index: u64 },

    #[error("Output already finalized: bridge {bridge_id}, index {output_index}")]
    AlreadyFinalized { bridge_id: u64, output_index: u64 },

    // ========================================================================
    // Withdrawal Errors
    // ========================================================================

    #[error("Failed to verify withdrawal: {reason}")]
    FailedToVerifyWithdrawal { reason: String },

    #[error("Withdrawal already finalized")]
    WithdrawalAlreadyFinalized,

    // ========================================================================
    // Migration & Oracle Errors
    // ========================================================================

    #[error("Migration info already registered: bridge {bridge_id}, denom {l1_denom}")]
    MigrationInfoAlreadyRegistered { bridge_id: u64, l1_denom: String },

    #[error("no currency pairs found")]
    NoCurrencyPairs,

    #[error("Arithmetic overflow")]
    Overflow,
}

impl HostError {
    pub fn unauthorized(signer: impl ToString) -> Self {
        HostError::Unauthorized {
            signer: signer.to_string(),
        }
    }
}
