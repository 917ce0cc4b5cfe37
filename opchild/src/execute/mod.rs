//! Execute handlers for the child bridge.
//!
//! Handlers are organized by category:
//! - `authority` - admin batches, validator set, params and migration registration
//! - `bridge` - bridge info, deposit finalization and withdrawals

mod authority;
mod bridge;

pub use authority::*;
pub use bridge::*;
