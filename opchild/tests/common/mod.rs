//! Shared fixture for the child integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use cosmwasm_std::testing::{mock_env, mock_info, MockStorage};
use cosmwasm_std::{
    from_json, Addr, Binary, Coin, Env, Event, Response, StdError, StdResult, Storage, Uint128,
};
use serde::de::DeserializeOwned;

use opchild::contract::{end_block, execute, instantiate, query};
use opchild::msg::{DepositMsg, ExecuteMsg, InstantiateMsg, QueryMsg};
use opchild::state::{BridgeInfo, Params};
use opchild::{ChildDeps, ChildError, DepositHook, EndBlock};
use opinit_common::address::DEFAULT_BECH32_PREFIX;
use opinit_common::testing::addr_make;
use opinit_common::{l2_denom, Bank, StoreBank};

pub const PREFIX: &str = DEFAULT_BECH32_PREFIX;
pub const BRIDGE_ID: u64 = 1;
pub const MAX_VALIDATORS: u32 = 10;
pub const BASE_DENOM: &str = "uinit";

/// Store key the recording hook writes before it decides to fail
pub const HOOK_KEY: &[u8] = b"hook_marker";

/// Deposit hook that records its calls and can be told to fail
#[derive(Default)]
pub struct RecordingHook {
    pub calls: RefCell<Vec<(Addr, Coin, Binary)>>,
    pub fail: Cell<bool>,
}

impl DepositHook for RecordingHook {
    fn on_deposit(
        &self,
        store: &mut dyn Storage,
        _env: &Env,
        receiver: &Addr,
        amount: &Coin,
        hook_msg: &Binary,
    ) -> StdResult<Vec<Event>> {
        store.set(HOOK_KEY, hook_msg.as_slice());
        if self.fail.get() {
            return Err(StdError::generic_err("hook rejected"));
        }
        self.calls
            .borrow_mut()
            .push((receiver.clone(), amount.clone(), hook_msg.clone()));
        Ok(vec![Event::new("deposit_hook").add_attribute("receiver", receiver)])
    }
}

pub struct Suite {
    pub storage: MockStorage,
    pub bank: StoreBank,
    pub hook: RecordingHook,
    pub env: Env,
    pub authority: Addr,
    pub admin: Addr,
    pub executor: Addr,
    pub user: Addr,
}

impl Suite {
    /// Instantiated child with the bridge info already set.
    pub fn new() -> Self {
        let mut suite = Self::without_bridge_info();
        let executor = suite.executor.clone();
        let bridge_info = suite.bridge_info();
        suite
            .execute(&executor, ExecuteMsg::SetBridgeInfo { bridge_info })
            .unwrap();
        suite
    }

    pub fn without_bridge_info() -> Self {
        let mut suite = Suite {
            storage: MockStorage::new(),
            bank: StoreBank,
            hook: RecordingHook::default(),
            env: mock_env(),
            authority: addr_make(PREFIX, "authority"),
            admin: addr_make(PREFIX, "admin"),
            executor: addr_make(PREFIX, "executor"),
            user: addr_make(PREFIX, "user"),
        };
        let params = suite.params();
        let info = mock_info(suite.authority.as_str(), &[]);
        instantiate(
            &mut suite.storage,
            suite.env.clone(),
            info,
            InstantiateMsg {
                authority: suite.authority.to_string(),
                params,
            },
        )
        .unwrap();
        suite
    }

    pub fn params(&self) -> Params {
        Params {
            bridge_executors: vec![self.executor.clone()],
            admin: self.admin.clone(),
            max_validators: MAX_VALIDATORS,
            bech32_prefix: PREFIX.to_string(),
        }
    }

    pub fn bridge_info(&self) -> BridgeInfo {
        BridgeInfo {
            bridge_id: BRIDGE_ID,
            bridge_addr: addr_make("l1", "bridge").to_string(),
            l1_chain_id: "l1-1".to_string(),
            l1_client_id: "07-tendermint-0".to_string(),
        }
    }

    pub fn execute(&mut self, sender: &Addr, msg: ExecuteMsg) -> Result<Response, ChildError> {
        let deps = ChildDeps {
            storage: &mut self.storage,
            bank: &self.bank,
            deposit_hook: &self.hook,
        };
        execute(deps, self.env.clone(), mock_info(sender.as_str(), &[]), msg)
    }

    /// Run authority messages through the admin batch.
    pub fn execute_as_admin(&mut self, messages: Vec<ExecuteMsg>) -> Result<Response, ChildError> {
        let admin = self.admin.clone();
        self.execute(&admin, ExecuteMsg::ExecuteMessages { messages })
    }

    pub fn query<T: DeserializeOwned>(&self, msg: QueryMsg) -> StdResult<T> {
        from_json(query(&self.storage, self.env.clone(), msg)?)
    }

    pub fn end_block(&mut self) -> Result<EndBlock, ChildError> {
        let res = end_block(&mut self.storage, self.env.clone());
        self.env.block.height += 1;
        self.env.block.time = self.env.block.time.plus_seconds(5);
        res
    }

    pub fn fund(&mut self, address: &Addr, amount: u128, denom: &str) {
        self.bank
            .mint(&mut self.storage, address, &[Coin::new(amount, denom)])
            .unwrap();
    }

    pub fn balance(&self, address: &Addr, denom: &str) -> Uint128 {
        self.bank.balance(&self.storage, address, denom).unwrap()
    }

    pub fn supply(&self, denom: &str) -> Uint128 {
        self.bank.supply(&self.storage, denom).unwrap()
    }

    /// L2 denom of [`BASE_DENOM`]
    pub fn denom(&self) -> String {
        l2_denom(BRIDGE_ID, BASE_DENOM)
    }

    pub fn deposit_msg(&self, sequence: u64, amount: u128) -> DepositMsg {
        DepositMsg {
            sequence,
            from: addr_make("l1", "depositor").to_string(),
            to: self.user.to_string(),
            amount: Coin::new(amount, self.denom()),
            base_denom: BASE_DENOM.to_string(),
            height: 100 + sequence,
            hook_msg: None,
        }
    }

    pub fn deposit(&mut self, sequence: u64, amount: u128) -> Result<Response, ChildError> {
        let executor = self.executor.clone();
        let msg = self.deposit_msg(sequence, amount);
        self.execute(&executor, ExecuteMsg::Deposit(msg))
    }
}

/// Value of the first attribute `key` in event `ty`.
pub fn event_attr(res: &Response, ty: &str, key: &str) -> Option<String> {
    res.events
        .iter()
        .filter(|event| event.ty == ty)
        .flat_map(|event| event.attributes.iter())
        .find(|attr| attr.key == key)
        .map(|attr| attr.value.clone())
}
