//! OPinit Child Bridge - L2 Side of an Optimistic Rollup Bridge
//!
//! # Token Flow
//! - L1 to L2: a bridge executor relays each host deposit (`Deposit`); the
//!   L2 denom is minted to the receiver once per L1 sequence
//! - L2 to L1: `Withdraw` burns L2 coins and assigns the next L2 sequence;
//!   the emitted withdrawal hash is what the host later proves
//! - Migrated denoms arrive as IBC vouchers and are swapped for the L2 denom
//!   by [`MigrationMiddleware`]
//!
//! # Validator Set
//! The module authority adds and removes validators; `end_block` reports the
//! power changes to consensus.

pub mod contract;
pub mod deps;
pub mod error;
mod execute;
pub mod genesis;
pub mod hooks;
pub mod keeper;
pub mod middleware;
pub mod msg;
mod query;
pub mod state;
pub mod validators;

pub use crate::deps::ChildDeps;
pub use crate::error::ChildError;
pub use crate::hooks::{DepositHook, NoopDepositHook};
pub use crate::middleware::MigrationMiddleware;
pub use crate::validators::EndBlock;
