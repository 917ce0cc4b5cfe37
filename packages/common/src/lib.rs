//! OPinit Common - Shared Primitives for the Host and Child Bridges
//!
//! Both state machines depend on this package for everything whose byte
//! layout is part of consensus:
//! - `hash` - output roots, withdrawal hashes, Merkle node hashes, L2 denoms
//!   and the oracle-prices commitment
//! - `address` - bech32 codec and deterministic module addresses
//! - `ibc` - ICS-20 packet types, IBC denoms and the IBC collaborator traits
//!
//! It also carries the pieces of the host platform the state machines run
//! against: a transactional `CacheStore` and the `Bank` keeper interface with
//! a store-backed implementation.

pub mod address;
pub mod bank;
pub mod hash;
pub mod ibc;
pub mod store;

#[cfg(feature = "testing")]
pub mod testing;

pub use crate::address::AddressError;
pub use crate::bank::{Bank, BankError, StoreBank};
pub use crate::hash::{l2_denom, node_hash, output_root, sha3_256, withdrawal_hash};
pub use crate::store::CacheStore;
