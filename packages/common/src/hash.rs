//! Deterministic hash derivations shared by the host and child bridges.
//!
//! Every function here is consensus-critical: the host verifies withdrawals
//! against roots built by the child, and off-chain executors rebuild the same
//! values, so the byte layouts below must never change.
//!
//! # Byte Layouts
//! - L2 denom:        `"l2/" || hex(SHA3-256(be_u64(bridge_id) || l1_denom))`
//! - Output root:     `SHA3-256(version || storage_root[32] || last_block_hash[32])`
//! - Withdrawal leaf: `SHA3-256(be_u64(bridge_id) || be_u64(sequence) || SHA3-256(sender)
//!                    || SHA3-256(receiver) || SHA3-256(denom) || be_u64(amount))`
//! - Withdrawal hash: `SHA3-256(leaf)`
//! - Node hash:       `SHA3-256(min(a, b) || max(a, b))`
//! - Oracle prices:   `SHA-256(for each entry by ascending id:
//!                    be_u64(id) || pair || decimal(price) || be_u64(timestamp_ns))`

use std::cmp::Ordering;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint256;
use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Sha3};

/// Prefix of every L2 denom derived from an L1 denom.
pub const L2_DENOM_PREFIX: &str = "l2/";

/// Compute SHA3-256 of arbitrary data
pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    sha3_256_concat(&[data])
}

/// Compute SHA3-256 over the concatenation of `parts` without copying them.
pub fn sha3_256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha3::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute SHA-256 of arbitrary data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Derive the L2 denom a bridge mints for `l1_denom`.
///
/// The bridge id is part of the preimage, so the same L1 denom bridged over
/// two bridges yields two distinct L2 denoms.
pub fn l2_denom(bridge_id: u64, l1_denom: &str) -> String {
    let digest = sha3_256_concat(&[&bridge_id.to_be_bytes(), l1_denom.as_bytes()]);
    format!("{}{}", L2_DENOM_PREFIX, hex::encode(digest))
}

/// Compute the output root committed by a proposer.
///
/// Only the first byte of the 32-byte version field takes part in the root.
pub fn output_root(version: u8, storage_root: &[u8; 32], last_block_hash: &[u8; 32]) -> [u8; 32] {
    sha3_256_concat(&[&[version], storage_root, last_block_hash])
}

/// Compute the single-hashed withdrawal leaf.
pub fn withdrawal_leaf(
    bridge_id: u64,
    sequence: u64,
    sender: &str,
    receiver: &str,
    denom: &str,
    amount: u64,
) -> [u8; 32] {
    sha3_256_concat(&[
        &bridge_id.to_be_bytes(),
        &sequence.to_be_bytes(),
        &sha3_256(sender.as_bytes()),
        &sha3_256(receiver.as_bytes()),
        &sha3_256(denom.as_bytes()),
        &amount.to_be_bytes(),
    ])
}

/// Compute the withdrawal hash used as the Merkle leaf (double SHA3-256).
pub fn withdrawal_hash(
    bridge_id: u64,
    sequence: u64,
    sender: &str,
    receiver: &str,
    denom: &str,
    amount: u64,
) -> [u8; 32] {
    sha3_256(&withdrawal_leaf(
        bridge_id, sequence, sender, receiver, denom, amount,
    ))
}

/// Hash two Merkle children into their parent.
///
/// The hash is commutative: children are ordered lexicographically before
/// hashing, so proofs do not carry left/right flags. Equal children hash as
/// `b || a`.
pub fn node_hash(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    match a.cmp(b) {
        Ordering::Less => sha3_256_concat(&[a, b]),
        Ordering::Greater | Ordering::Equal => sha3_256_concat(&[b, a]),
    }
}

/// Fold a proof path from `leaf` up to the root it implies.
pub fn compute_merkle_root(leaf: [u8; 32], proofs: &[[u8; 32]]) -> [u8; 32] {
    proofs
        .iter()
        .fold(leaf, |node, sibling| node_hash(&node, sibling))
}

/// One quotation taking part in the oracle-prices commitment
#[cw_serde]
pub struct OraclePriceEntry {
    /// Dense currency-pair id assigned by the oracle
    pub currency_pair_id: u64,
    /// Pair string, e.g. `BTC/USD`
    pub currency_pair: String,
    /// Quoted price
    pub price: Uint256,
    /// Quote time in unix nanoseconds
    pub timestamp_ns: u64,
}

/// Hash a set of price quotations.
///
/// The result does not depend on the order of `entries`.
pub fn oracle_prices_hash(entries: &[OraclePriceEntry]) -> [u8; 32] {
    let mut sorted: Vec<&OraclePriceEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.currency_pair_id);

    let mut hasher = Sha256::new();
    for entry in sorted {
        hasher.update(entry.currency_pair_id.to_be_bytes());
        hasher.update(entry.currency_pair.as_bytes());
        hasher.update(entry.price.to_string().as_bytes());
        hasher.update(entry.timestamp_ns.to_be_bytes());
    }
    hasher.finalize().into()
}

/// Convert a byte slice to a fixed 32-byte array, returning the actual length on mismatch.
pub fn to_bytes32(bytes: &[u8]) -> Result<[u8; 32], usize> {
    bytes.try_into().map_err(|_| bytes.len())
}

/// Convert 32-byte hash to hex string (for attributes/logging)
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_denom_vector() {
        assert_eq!(
            l2_denom(1, "uinit"),
            "l2/771d639f30fbe45e3fbca954ffbe2fcc26f915f5513c67a4a2d0bc1d635bdefd"
        );
    }

    #[test]
    fn test_l2_denom_is_bridge_scoped() {
        assert_ne!(l2_denom(1, "uinit"), l2_denom(2, "uinit"));
        assert_eq!(l2_denom(7, "uatom"), l2_denom(7, "uatom"));
    }

    #[test]
    fn test_output_root_vector() {
        let root = output_root(1, &[2u8; 32], &[3u8; 32]);
        assert_eq!(
            bytes32_to_hex(&root),
            "df7e9d986c81dd686b967dc50645fe47d567d20a7037e601787d1ffdba47ff76"
        );
    }

    #[test]
    fn test_withdrawal_hash_vector() {
        let leaf = withdrawal_leaf(1, 1, "from", "to", "uinit", 100);
        assert_eq!(
            bytes32_to_hex(&leaf),
            "3ddde3aabf6e4cd3f6c9da416d4a33acced37d58629fb204071e14d6fdf6f8a8"
        );

        let hash = withdrawal_hash(1, 1, "from", "to", "uinit", 100);
        assert_eq!(hash, sha3_256(&leaf));
        assert_eq!(
            bytes32_to_hex(&hash),
            "c9b0009c34a8f7f9e5b04f2a4e9a2bed5ce9d84e965bbee766ce0d258a5fac5f"
        );
    }

    #[test]
    fn test_withdrawal_hash_binds_every_field() {
        let base = withdrawal_hash(1, 1, "from", "to", "uinit", 100);
        assert_ne!(base, withdrawal_hash(2, 1, "from", "to", "uinit", 100));
        assert_ne!(base, withdrawal_hash(1, 2, "from", "to", "uinit", 100));
        assert_ne!(base, withdrawal_hash(1, 1, "frm", "to", "uinit", 100));
        assert_ne!(base, withdrawal_hash(1, 1, "from", "t0", "uinit", 100));
        assert_ne!(base, withdrawal_hash(1, 1, "from", "to", "uusdc", 100));
        assert_ne!(base, withdrawal_hash(1, 1, "from", "to", "uinit", 101));
    }

    #[test]
    fn test_node_hash_ordering() {
        let a = [1u8; 32];
        let b = [2u8; 32];

        // a < b
        assert_eq!(
            bytes32_to_hex(&node_hash(&a, &b)),
            "adcb9583b7caa53aff2b8f4ed8aaf407399051b1b4f5a39aa2c97d5069b50657"
        );
        // a > b hashes the same pair in sorted order
        assert_eq!(node_hash(&b, &a), node_hash(&a, &b));
        // equal children
        assert_eq!(node_hash(&a, &a), sha3_256_concat(&[&a, &a]));
    }

    #[test]
    fn test_merkle_fold() {
        let leaf = withdrawal_hash(1, 1, "from", "to", "uinit", 100);
        let proofs = [[9u8; 32], [0u8; 32], [0xffu8; 32]];

        let expected = node_hash(&node_hash(&node_hash(&leaf, &proofs[0]), &proofs[1]), &proofs[2]);
        assert_eq!(compute_merkle_root(leaf, &proofs), expected);
        assert_eq!(compute_merkle_root(leaf, &[]), leaf);
    }

    fn price(id: u64, pair: &str, price: u128, ts: u64) -> OraclePriceEntry {
        OraclePriceEntry {
            currency_pair_id: id,
            currency_pair: pair.to_string(),
            price: Uint256::from(price),
            timestamp_ns: ts,
        }
    }

    #[test]
    fn test_oracle_prices_hash_vector() {
        let entries = vec![
            price(0, "BTC/USD", 10_000_000, 1000),
            price(1, "ETH/USD", 200_000, 1000),
        ];
        assert_eq!(
            bytes32_to_hex(&oracle_prices_hash(&entries)),
            "a938818b9998e5181d4e59f40cabba093e0e3325b71be452947275475af9a1bb"
        );
    }

    #[test]
    fn test_oracle_prices_hash_permutation_invariant() {
        let forward = vec![
            price(0, "BTC/USD", 10_000_000, 1000),
            price(1, "ETH/USD", 200_000, 1000),
        ];
        let reversed: Vec<_> = forward.iter().rev().cloned().collect();
        assert_eq!(oracle_prices_hash(&forward), oracle_prices_hash(&reversed));

        let repriced = vec![
            price(0, "BTC/USD", 10_000_001, 1000),
            price(1, "ETH/USD", 200_000, 1000),
        ];
        assert_ne!(oracle_prices_hash(&forward), oracle_prices_hash(&repriced));

        let retimed = vec![
            price(0, "BTC/USD", 10_000_000, 1001),
            price(1, "ETH/USD", 200_000, 1000),
        ];
        assert_ne!(oracle_prices_hash(&forward), oracle_prices_hash(&retimed));
    }

    #[test]
    fn test_bytes32_to_hex() {
        let hex_str = bytes32_to_hex(&[0xabu8; 32]);
        assert_eq!(hex_str.len(), 64);
        assert_eq!(hex_str, "ab".repeat(32));
    }

    #[test]
    fn test_to_bytes32_reports_length() {
        assert_eq!(to_bytes32(&[0u8; 31]), Err(31));
        assert_eq!(to_bytes32(&[7u8; 32]), Ok([7u8; 32]));
    }
}
