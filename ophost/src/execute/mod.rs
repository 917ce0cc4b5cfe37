//! Execute handlers for the host bridge.
//!
//! Handlers are organized by category:
//! - `bridge` - bridge registry and role/config updates
//! - `output` - batch records, output proposals and challenger deletions
//! - `deposit` - L1 to L2 deposits, escrowed or forwarded over IBC
//! - `withdraw` - proven L2 to L1 withdrawals
//! - `governance` - params and migration registration

mod bridge;
mod deposit;
mod governance;
mod output;
mod withdraw;

pub use bridge::*;
pub use deposit::*;
pub use governance::*;
pub use output::*;
pub use withdraw::*;
