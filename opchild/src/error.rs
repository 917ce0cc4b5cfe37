//! Error types for the OPinit child bridge

use cosmwasm_std::StdError;
use opinit_common::{AddressError, BankError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ChildError {
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

    #[error("Nested ExecuteMessages is not allowed")]
    NestedExecuteMessages,

    #[error("Not an authority message: {msg}")]
    NotAuthorityMessage { msg: String },

    #[error("ExecuteMessages carries no messages")]
    EmptyMessages,

    // ========================================================================
    // Bridge Info Errors
    // ========================================================================

    #[error("Bridge info not set")]
    BridgeInfoNotSet,

    #[error("Bridge id is immutable: current {current}, got {got}")]
    BridgeInfoImmutable { current: u64, got: u64 },

    #[error("Invalid bridge info: {reason}")]
    InvalidBridgeInfo { reason: String },

    // ========================================================================
    // Validator Errors
    // ========================================================================

    #[error("Validator already exists: {address}")]
    ValidatorAlreadyExists { address: String },

    #[error("Validator not found: {address}")]
    ValidatorNotFound { address: String },

    #[error("Invalid consensus pubkey: expected 32 bytes, got {got}")]
    InvalidPubkey { got: usize },

    #[error("Validator set overflow: {count} validators exceed max {max}")]
    ValidatorSetOverflow { count: usize, max: u32 },

    // ========================================================================
    // Token Errors
    // ========================================================================

    #[error("Invalid denom: {denom}")]
    InvalidDenom { denom: String },

    #[error("Token pair not found: {denom}")]
    TokenPairNotFound { denom: String },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid sequence")]
    InvalidSequence,

    #[error("Migration info already registered: {denom}")]
    MigrationInfoAlreadyRegistered { denom: String },

    #[error("Invalid migration info: {reason}")]
    InvalidMigrationInfo { reason: String },

    // ========================================================================
    // Configuration Errors
    // ========================================================================

    #[error("Invalid params: {reason}")]
    InvalidParams { reason: String },

    #[error("Arithmetic overflow")]
    Overflow,
}

impl ChildError {
    pub fn unauthorized(signer: impl ToString) -> Self {
        ChildError::Unauthorized {
            signer: signer.to_string(),
        }
    }
}
