//! Oracle-price commitment.
//!
//! At the start of every block the current quotations are collected from the
//! [`OracleProvider`], hashed with `oracle_prices_hash`, and stored as the
//! latest L1-anchored attestation that child chains relay prices against.

use cosmwasm_std::{Env, Event, Response, Storage, Uint256};
use opinit_common::hash::{bytes32_to_hex, oracle_prices_hash, OraclePriceEntry};
use tracing::debug;

use crate::error::HostError;
use crate::state::{OraclePriceHash, ORACLE_PRICE_HASH};

/// Price quoted for a currency pair
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePrice {
    pub price: Uint256,
    /// Unix nanoseconds
    pub block_timestamp_ns: u64,
}

pub trait OracleProvider {
    /// Number of currency pair ids handed out; ids are `0..n`.
    fn next_currency_pair_id(&self, store: &dyn Storage) -> u64;

    /// Pair string (`BASE/QUOTE`) of an id, if the id is still assigned.
    fn currency_pair(&self, store: &dyn Storage, id: u64) -> Option<String>;

    /// Current quote of a pair, if one exists.
    fn price(&self, store: &dyn Storage, currency_pair: &str) -> Option<QuotePrice>;
}

/// Collect every available quotation, skipping ids without a pair or a price.
pub fn collect_prices(
    store: &dyn Storage,
    oracle: &dyn OracleProvider,
) -> Result<Vec<OraclePriceEntry>, HostError> {
    let count = oracle.next_currency_pair_id(store);
    if count == 0 {
        return Err(HostError::NoCurrencyPairs);
    }

    let mut entries = Vec::new();
    for id in 0..count {
        let Some(pair) = oracle.currency_pair(store, id) else {
            continue;
        };
        let Some(quote) = oracle.price(store, &pair) else {
            continue;
        };
        entries.push(OraclePriceEntry {
            currency_pair_id: id,
            currency_pair: pair,
            price: quote.price,
            timestamp_ns: quote.block_timestamp_ns,
        });
    }
    Ok(entries)
}

/// Refresh the oracle-price commitment; a no-op without a provider.
pub fn update_oracle_price_hash(
    store: &mut dyn Storage,
    env: &Env,
    oracle: Option<&dyn OracleProvider>,
) -> Result<Response, HostError> {
    let Some(oracle) = oracle else {
        return Ok(Response::new());
    };

    let entries = collect_prices(store, oracle)?;
    let hash = oracle_prices_hash(&entries);
    let attestation = OraclePriceHash {
        hash,
        l1_block_height: env.block.height,
        l1_block_time_ns: env.block.time.nanos(),
    };
    ORACLE_PRICE_HASH.save(store, &attestation)?;

    debug!(
        height = env.block.height,
        pairs = entries.len(),
        "oracle price hash updated"
    );

    Ok(Response::new().add_event(
        Event::new("oracle_price")
            .add_attribute("oracle_price_hash", bytes32_to_hex(&hash))
            .add_attribute("l1_block_height", env.block.height.to_string())
            .add_attribute("l1_block_time", env.block.time.nanos().to_string())
            .add_attribute("num_prices", entries.len().to_string()),
    ))
}
