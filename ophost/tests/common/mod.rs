//! Shared fixture for the host integration tests.

#![allow(dead_code)]

use std::cell::RefCell;

use cosmwasm_std::testing::{mock_env, mock_info, MockStorage};
use cosmwasm_std::{
    from_json, Addr, Binary, Coin, Env, Response, StdError, StdResult, Storage, Timestamp,
    Uint128,
};
use serde::de::DeserializeOwned;

use opinit_common::address::DEFAULT_BECH32_PREFIX;
use opinit_common::testing::{addr_make, MockChannelKeeper, MockTransferRouter};
use opinit_common::{Bank, StoreBank};
use ophost::contract::{execute, instantiate, query};
use ophost::msg::{CreateBridgeResponse, ExecuteMsg, InstantiateMsg, QueryMsg};
use ophost::state::{BatchInfo, BridgeConfig, Params};
use ophost::{BridgeHooks, HostDeps, HostError};

pub const PREFIX: &str = DEFAULT_BECH32_PREFIX;
pub const SUBMISSION_INTERVAL: u64 = 10;
pub const FINALIZATION_PERIOD: u64 = 60;

/// Hooks that record bridge ids and can be told to fail
#[derive(Default)]
pub struct RecordingHooks {
    pub created: RefCell<Vec<u64>>,
    pub metadata_updated: RefCell<Vec<u64>>,
    pub fail: RefCell<bool>,
}

impl BridgeHooks for RecordingHooks {
    fn bridge_created(
        &self,
        _store: &mut dyn Storage,
        bridge_id: u64,
        _config: &BridgeConfig,
    ) -> StdResult<()> {
        if *self.fail.borrow() {
            return Err(StdError::generic_err("hook failure"));
        }
        self.created.borrow_mut().push(bridge_id);
        Ok(())
    }

    fn bridge_metadata_updated(
        &self,
        _store: &mut dyn Storage,
        bridge_id: u64,
        _config: &BridgeConfig,
    ) -> StdResult<()> {
        self.metadata_updated.borrow_mut().push(bridge_id);
        Ok(())
    }
}

pub struct Suite {
    pub storage: MockStorage,
    pub bank: StoreBank,
    pub transfer: MockTransferRouter,
    pub channels: MockChannelKeeper,
    pub hooks: RecordingHooks,
    pub env: Env,
    pub authority: Addr,
    pub proposer: Addr,
    pub challenger: Addr,
    pub user: Addr,
}

impl Suite {
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    pub fn with_params(params: Params) -> Self {
        let mut suite = Suite {
            storage: MockStorage::new(),
            bank: StoreBank,
            transfer: MockTransferRouter::new(PREFIX),
            channels: MockChannelKeeper::with_channel("opinit", "channel-1"),
            hooks: RecordingHooks::default(),
            env: mock_env(),
            authority: addr_make(PREFIX, "authority"),
            proposer: addr_make(PREFIX, "proposer"),
            challenger: addr_make(PREFIX, "challenger"),
            user: addr_make(PREFIX, "user"),
        };
        let info = mock_info(suite.authority.as_str(), &[]);
        instantiate(
            &mut suite.storage,
            suite.env.clone(),
            info,
            InstantiateMsg {
                authority: suite.authority.to_string(),
                params: Some(params),
            },
        )
        .unwrap();
        suite
    }

    pub fn execute(&mut self, sender: &Addr, msg: ExecuteMsg) -> Result<Response, HostError> {
        let deps = HostDeps {
            storage: &mut self.storage,
            bank: &self.bank,
            transfer: &self.transfer,
            channels: &self.channels,
            hooks: &self.hooks,
        };
        execute(deps, self.env.clone(), mock_info(sender.as_str(), &[]), msg)
    }

    pub fn query<T: DeserializeOwned>(&self, msg: QueryMsg) -> StdResult<T> {
        from_json(query(&self.storage, self.env.clone(), msg)?)
    }

    pub fn advance(&mut self, seconds: u64) {
        self.env.block.height += seconds / 5 + 1;
        self.env.block.time = self.env.block.time.plus_seconds(seconds);
    }

    pub fn fund(&mut self, address: &Addr, amount: u128, denom: &str) {
        self.bank
            .mint(&mut self.storage, address, &[Coin::new(amount, denom)])
            .unwrap();
    }

    pub fn balance(&self, address: &Addr, denom: &str) -> Uint128 {
        self.bank.balance(&self.storage, address, denom).unwrap()
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            proposer: self.proposer.clone(),
            challenger: self.challenger.clone(),
            submission_interval: SUBMISSION_INTERVAL,
            finalization_period: FINALIZATION_PERIOD,
            submission_start_time: self.env.block.time,
            metadata: Binary::default(),
            batch_info: BatchInfo {
                submitter: self.proposer.to_string(),
                chain_type: "l1".to_string(),
            },
            oracle_enabled: false,
            attestor_set: vec![],
        }
    }

    /// Register a bridge with the default config and return its id.
    pub fn create_bridge(&mut self) -> u64 {
        let config = self.bridge_config();
        let creator = self.proposer.clone();
        let res = self
            .execute(&creator, ExecuteMsg::CreateBridge { config })
            .unwrap();
        let data: CreateBridgeResponse = from_json(res.data.unwrap()).unwrap();
        data.bridge_id
    }

    pub fn propose(
        &mut self,
        bridge_id: u64,
        output_index: u64,
        l2_block_number: u64,
        output_root: [u8; 32],
    ) -> Result<Response, HostError> {
        let proposer = self.proposer.clone();
        self.execute(
            &proposer,
            ExecuteMsg::ProposeOutput {
                bridge_id,
                output_index,
                l2_block_number,
                output_root: Binary::from(output_root.to_vec()),
            },
        )
    }

    pub fn deposit(
        &mut self,
        sender: &Addr,
        bridge_id: u64,
        amount: u128,
        denom: &str,
    ) -> Result<Response, HostError> {
        let to = addr_make("l2", "receiver");
        self.execute(
            sender,
            ExecuteMsg::InitiateTokenDeposit {
                bridge_id,
                to: to.to_string(),
                amount: Coin::new(amount, denom),
                data: None,
            },
        )
    }

    pub fn now(&self) -> Timestamp {
        self.env.block.time
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
