//! Bech32 address codec and deterministic module addresses.
//!
//! ## Module Addresses
//!
//! | Address | Derivation |
//! |---|---|
//! | Module account | `SHA-256(name)[..20]` |
//! | Derived module account | `SHA-256(0x00 \|\| module \|\| key)[..20]` |
//! | Bridge escrow | derived account of `"ophost"` with key `be_u64(bridge_id)` |
//! | ICS-20 escrow | `SHA-256("ics20-1" \|\| 0x00 \|\| port "/" channel)[..20]` |
//! | Consensus address | `SHA-256(ed25519_pubkey)[..20]` |

use bech32::{FromBase32, ToBase32, Variant};
use cosmwasm_std::Addr;
use thiserror::Error;

use crate::hash::sha256;

/// Length of every address derived in this module
pub const ADDRESS_LENGTH: usize = 20;

/// Default bech32 prefix of the host chain
pub const DEFAULT_BECH32_PREFIX: &str = "init";

/// Module name the bridge escrow accounts are derived from
pub const OPHOST_MODULE_NAME: &str = "ophost";

/// Module receiving bridge registration fees
pub const COMMUNITY_POOL_MODULE_NAME: &str = "distribution";

/// ICS-20 version string used in escrow address derivation
pub const ICS20_VERSION: &str = "ics20-1";

#[derive(Error, Debug, PartialEq)]
pub enum AddressError {
    #[error("Invalid address {address}: {reason}")]
    Invalid { address: String, reason: String },

    #[error("Invalid bech32 prefix for {address}: expected {expected}")]
    WrongPrefix { address: String, expected: String },
}

impl AddressError {
    fn invalid(address: &str, reason: impl ToString) -> Self {
        AddressError::Invalid {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Encode raw address bytes as a bech32 address under `prefix`.
pub fn encode(prefix: &str, bytes: &[u8]) -> Result<Addr, AddressError> {
    let encoded = bech32::encode(prefix, bytes.to_base32(), Variant::Bech32)
        .map_err(|e| AddressError::invalid(prefix, e))?;
    Ok(Addr::unchecked(encoded))
}

/// Decode a bech32 address of any prefix into `(prefix, bytes)`.
pub fn decode(address: &str) -> Result<(String, Vec<u8>), AddressError> {
    let (hrp, data, variant) =
        bech32::decode(address).map_err(|e| AddressError::invalid(address, e))?;
    if variant != Variant::Bech32 {
        return Err(AddressError::invalid(address, "bech32m is not accepted"));
    }
    let bytes = Vec::<u8>::from_base32(&data).map_err(|e| AddressError::invalid(address, e))?;
    if bytes.len() != 20 && bytes.len() != 32 {
        return Err(AddressError::invalid(
            address,
            format!("unexpected length {}", bytes.len()),
        ));
    }
    Ok((hrp, bytes))
}

/// Validate an address against the expected bech32 prefix.
pub fn validate(prefix: &str, address: &str) -> Result<Addr, AddressError> {
    let (hrp, _) = decode(address)?;
    if hrp != prefix {
        return Err(AddressError::WrongPrefix {
            address: address.to_string(),
            expected: prefix.to_string(),
        });
    }
    // bech32 is case-insensitive; store keys use the canonical lowercase form
    Ok(Addr::unchecked(address.to_ascii_lowercase()))
}

/// Address of a named module account.
pub fn module_address(name: &str) -> [u8; ADDRESS_LENGTH] {
    truncate(sha256(name.as_bytes()))
}

/// Address of an account derived from a module and a derivation key.
pub fn derived_module_address(module: &str, key: &[u8]) -> [u8; ADDRESS_LENGTH] {
    let mut preimage = Vec::with_capacity(1 + module.len() + key.len());
    preimage.push(0u8);
    preimage.extend_from_slice(module.as_bytes());
    preimage.extend_from_slice(key);
    truncate(sha256(&preimage))
}

/// Raw escrow address of a bridge.
pub fn bridge_address_bytes(bridge_id: u64) -> [u8; ADDRESS_LENGTH] {
    derived_module_address(OPHOST_MODULE_NAME, &bridge_id.to_be_bytes())
}

/// Bech32 escrow address of a bridge.
pub fn bridge_address(prefix: &str, bridge_id: u64) -> Result<Addr, AddressError> {
    encode(prefix, &bridge_address_bytes(bridge_id))
}

/// Bech32 address of the community pool.
pub fn community_pool_address(prefix: &str) -> Result<Addr, AddressError> {
    encode(prefix, &module_address(COMMUNITY_POOL_MODULE_NAME))
}

/// Escrow address the ICS-20 application uses for a channel end.
pub fn ics20_escrow_address(prefix: &str, port_id: &str, channel_id: &str) -> Result<Addr, AddressError> {
    let contents = format!("{}/{}", port_id, channel_id);
    let mut preimage = Vec::with_capacity(ICS20_VERSION.len() + 1 + contents.len());
    preimage.extend_from_slice(ICS20_VERSION.as_bytes());
    preimage.push(0u8);
    preimage.extend_from_slice(contents.as_bytes());
    encode(prefix, &truncate(sha256(&preimage)))
}

/// Consensus address of an ed25519 validator key.
pub fn consensus_address(pubkey: &[u8]) -> [u8; ADDRESS_LENGTH] {
    truncate(sha256(pubkey))
}

fn truncate(digest: [u8; 32]) -> [u8; ADDRESS_LENGTH] {
    let mut out = [0u8; ADDRESS_LENGTH];
    out.copy_from_slice(&digest[..ADDRESS_LENGTH]);
    out
}
