//! OPinit Host Bridge - L1 Side of an Optimistic Rollup Bridge
//!
//! The host keeps a registry of independent bridges, each with its own
//! proposer, challenger and escrow account.
//!
//! # Output Lifecycle
//! 1. The proposer submits an output root for an L2 block (`ProposeOutput`)
//! 2. During the finalization period the challenger may delete it (`DeleteOutput`)
//! 3. Once the period elapses the output is final and cannot be deleted
//!
//! # Token Flow
//! - L1 to L2: `InitiateTokenDeposit` escrows coins in the bridge account, or
//!   forwards them over IBC when the denom has been migrated
//! - L2 to L1: `FinalizeTokenWithdrawal` releases escrowed coins against a
//!   Merkle proof rooted in a finalized output
//!
//! # Block Hooks
//! - `begin_block` refreshes the oracle-price commitment

pub mod contract;
pub mod deps;
pub mod error;
mod execute;
pub mod genesis;
pub mod hooks;
pub mod keeper;
pub mod msg;
pub mod oracle;
mod query;
pub mod state;

pub use crate::deps::HostDeps;
pub use crate::error::HostError;
pub use crate::execute::{forward_memo, FORWARDED_MEMO};
pub use crate::hooks::{BridgeHooks, NoopHooks};
pub use crate::oracle::{OracleProvider, QuotePrice};
