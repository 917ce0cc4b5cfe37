//! Bank keeper interface and the store-backed implementation.
//!
//! The bridges never own balances directly: escrow, release, mint and burn all
//! go through a [`Bank`]. [`StoreBank`] keeps balances in the same `Storage`
//! the bridge state lives in, so a rolled-back message also rolls back every
//! coin it moved.

use cosmwasm_std::{Addr, Coin, Order, OverflowError, StdError, StdResult, Storage, Uint128};
use cw_storage_plus::Map;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BankError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Insufficient funds: {address} has {available}{denom}, needs {required}{denom}")]
    InsufficientFunds {
        address: String,
        denom: String,
        available: Uint128,
        required: Uint128,
    },

    #[error("Invalid denom: {denom}")]
    InvalidDenom { denom: String },
}

pub trait Bank {
    /// Balance of a single denom.
    fn balance(&self, store: &dyn Storage, address: &Addr, denom: &str) -> StdResult<Uint128>;

    /// All non-zero balances of an account, ordered by denom.
    fn all_balances(&self, store: &dyn Storage, address: &Addr) -> StdResult<Vec<Coin>>;

    /// Move coins between two accounts.
    fn send(
        &self,
        store: &mut dyn Storage,
        from: &Addr,
        to: &Addr,
        amount: &[Coin],
    ) -> Result<(), BankError>;

    /// Create coins in an account.
    fn mint(&self, store: &mut dyn Storage, to: &Addr, amount: &[Coin]) -> Result<(), BankError>;

    /// Destroy coins held by an account.
    fn burn(&self, store: &mut dyn Storage, from: &Addr, amount: &[Coin]) -> Result<(), BankError>;
}

/// Balances keyed by (address, denom)
const BALANCES: Map<(&Addr, &str), Uint128> = Map::new("bank_balances");

/// Total supply per denom
const SUPPLY: Map<&str, Uint128> = Map::new("bank_supply");

#[derive(Debug, Default, Clone, Copy)]
pub struct StoreBank;

impl StoreBank {
    pub fn supply(&self, store: &dyn Storage, denom: &str) -> StdResult<Uint128> {
        Ok(SUPPLY.may_load(store, denom)?.unwrap_or_default())
    }

    fn add(&self, store: &mut dyn Storage, address: &Addr, coin: &Coin) -> Result<(), BankError> {
        let current = self.balance(store, address, &coin.denom)?;
        let updated = current.checked_add(coin.amount)?;
        BALANCES.save(store, (address, coin.denom.as_str()), &updated)?;
        Ok(())
    }

    fn sub(&self, store: &mut dyn Storage, address: &Addr, coin: &Coin) -> Result<(), BankError> {
        let current = self.balance(store, address, &coin.denom)?;
        if current < coin.amount {
            return Err(BankError::InsufficientFunds {
                address: address.to_string(),
                denom: coin.denom.clone(),
                available: current,
                required: coin.amount,
            });
        }
        let updated = current - coin.amount;
        if updated.is_zero() {
            BALANCES.remove(store, (address, coin.denom.as_str()));
        } else {
            BALANCES.save(store, (address, coin.denom.as_str()), &updated)?;
        }
        Ok(())
    }
}

fn check_denom(coin: &Coin) -> Result<(), BankError> {
    if coin.denom.trim().is_empty() {
        return Err(BankError::InvalidDenom {
            denom: coin.denom.clone(),
        });
    }
    Ok(())
}

impl Bank for StoreBank {
    fn balance(&self, store: &dyn Storage, address: &Addr, denom: &str) -> StdResult<Uint128> {
        Ok(BALANCES
            .may_load(store, (address, denom))?
            .unwrap_or_default())
    }

    fn all_balances(&self, store: &dyn Storage, address: &Addr) -> StdResult<Vec<Coin>> {
        BALANCES
            .prefix(address)
            .range(store, None, None, Order::Ascending)
            .map(|item| {
                let (denom, amount) = item?;
                Ok(Coin { denom, amount })
            })
            .collect()
    }

    fn send(
        &self,
        store: &mut dyn Storage,
        from: &Addr,
        to: &Addr,
        amount: &[Coin],
    ) -> Result<(), BankError> {
        for coin in amount.iter().filter(|c| !c.amount.is_zero()) {
            check_denom(coin)?;
            self.sub(store, from, coin)?;
            self.add(store, to, coin)?;
        }
        Ok(())
    }

    fn mint(&self, store: &mut dyn Storage, to: &Addr, amount: &[Coin]) -> Result<(), BankError> {
        for coin in amount.iter().filter(|c| !c.amount.is_zero()) {
            check_denom(coin)?;
            let supply = self.supply(store, &coin.denom)?.checked_add(coin.amount)?;
            SUPPLY.save(store, &coin.denom, &supply)?;
            self.add(store, to, coin)?;
        }
        Ok(())
    }

    fn burn(&self, store: &mut dyn Storage, from: &Addr, amount: &[Coin]) -> Result<(), BankError> {
        for coin in amount.iter().filter(|c| !c.amount.is_zero()) {
            check_denom(coin)?;
            self.sub(store, from, coin)?;
            let supply = self.supply(store, &coin.denom)?.checked_sub(coin.amount)?;
            SUPPLY.save(store, &coin.denom, &supply)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::coin;
    use cosmwasm_std::testing::MockStorage;

    #[test]
    fn test_mint_send_burn() {
        let mut store = MockStorage::new();
        let bank = StoreBank;
        let alice = Addr::unchecked("alice");
        let bob = Addr::unchecked("bob");

        bank.mint(&mut store, &alice, &[coin(100, "uinit")]).unwrap();
        bank.send(&mut store, &alice, &bob, &[coin(40, "uinit")]).unwrap();
        bank.burn(&mut store, &bob, &[coin(10, "uinit")]).unwrap();

        assert_eq!(bank.balance(&store, &alice, "uinit").unwrap(), Uint128::new(60));
        assert_eq!(bank.balance(&store, &bob, "uinit").unwrap(), Uint128::new(30));
        assert_eq!(bank.supply(&store, "uinit").unwrap(), Uint128::new(90));
    }

    #[test]
    fn test_insufficient_funds() {
        let mut store = MockStorage::new();
        let bank = StoreBank;
        let alice = Addr::unchecked("alice");
        let bob = Addr::unchecked("bob");

        bank.mint(&mut store, &alice, &[coin(5, "uinit")]).unwrap();
        let err = bank
            .send(&mut store, &alice, &bob, &[coin(6, "uinit")])
            .unwrap_err();
        assert_eq!(
            err,
            BankError::InsufficientFunds {
                address: "alice".to_string(),
                denom: "uinit".to_string(),
                available: Uint128::new(5),
                required: Uint128::new(6),
            }
        );
    }

    #[test]
    fn test_all_balances_drops_empty_entries() {
        let mut store = MockStorage::new();
        let bank = StoreBank;
        let alice = Addr::unchecked("alice");

        bank.mint(&mut store, &alice, &[coin(5, "uatom"), coin(7, "uinit")]).unwrap();
        bank.burn(&mut store, &alice, &[coin(5, "uatom")]).unwrap();

        assert_eq!(bank.all_balances(&store, &alice).unwrap(), vec![coin(7, "uinit")]);
    }
}
