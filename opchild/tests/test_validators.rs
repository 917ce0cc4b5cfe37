//! Validator set and authority message integration tests.

mod common;

use cosmwasm_std::{Addr, Binary, Coin};
use opchild::msg::{ExecuteMsg, ParamsResponse, QueryMsg, ValidatorResponse, ValidatorsResponse};
use opchild::state::{BridgeInfo, ValidatorUpdate};
use opchild::ChildError;
use opinit_common::testing::addr_make;

use common::{event_attr, Suite, PREFIX};

fn pubkey(byte: u8) -> Binary {
    Binary::from(vec![byte; 32])
}

fn add_validator(label: &str, key: u8) -> ExecuteMsg {
    ExecuteMsg::AddValidator {
        moniker: label.to_string(),
        operator_address: addr_make(PREFIX, label).to_string(),
        consensus_pubkey: pubkey(key),
    }
}

fn operator(label: &str) -> Addr {
    addr_make(PREFIX, label)
}

fn validators(suite: &Suite) -> ValidatorsResponse {
    suite
        .query(QueryMsg::Validators {
            start_after: None,
            limit: None,
        })
        .unwrap()
}

// ============================================================================
// ExecuteMessages
// ============================================================================

#[test]
fn test_admin_batch_runs_as_authority() {
    let mut suite = Suite::new();
    let res = suite
        .execute_as_admin(vec![add_validator("val1", 1), add_validator("val2", 2)])
        .unwrap();
    assert_eq!(event_attr(&res, "execute_messages", "count").as_deref(), Some("2"));
    assert_eq!(
        res.events.iter().filter(|e| e.ty == "add_validator").count(),
        2
    );

    let res: ValidatorResponse = suite
        .query(QueryMsg::Validator {
            operator_address: operator("val1").to_string(),
        })
        .unwrap();
    assert_eq!(res.validator.consensus_power, 1);
    assert_eq!(res.validator.moniker, "val1");
}

#[test]
fn test_admin_batch_rules() {
    let mut suite = Suite::new();
    let user = suite.user.clone();

    assert_eq!(
        suite.execute(
            &user,
            ExecuteMsg::ExecuteMessages {
                messages: vec![add_validator("val1", 1)]
            }
        ),
        Err(ChildError::unauthorized(&user))
    );
    assert_eq!(suite.execute_as_admin(vec![]), Err(ChildError::EmptyMessages));
    assert_eq!(
        suite.execute_as_admin(vec![ExecuteMsg::ExecuteMessages {
            messages: vec![add_validator("val1", 1)]
        }]),
        Err(ChildError::NestedExecuteMessages)
    );
    let denom = suite.denom();
    assert_eq!(
        suite.execute_as_admin(vec![ExecuteMsg::Withdraw {
            to: addr_make("l1", "receiver").to_string(),
            amount: Coin::new(1, denom),
        }]),
        Err(ChildError::NotAuthorityMessage {
            msg: "withdraw".to_string()
        })
    );
    let bridge_info = suite.bridge_info();
    assert_eq!(
        suite.execute_as_admin(vec![ExecuteMsg::SetBridgeInfo { bridge_info }]),
        Err(ChildError::NotAuthorityMessage {
            msg: "set_bridge_info".to_string()
        })
    );
}

#[test]
fn test_admin_batch_is_atomic() {
    let mut suite = Suite::new();
    assert_eq!(
        suite.execute_as_admin(vec![add_validator("val1", 1), add_validator("val2", 1)]),
        Err(ChildError::ValidatorAlreadyExists {
            address: operator("val1").to_string()
        })
    );
    assert!(validators(&suite).validators.is_empty());
}

#[test]
fn test_authority_messages_check_signer() {
    let mut suite = Suite::new();
    let user = suite.user.clone();
    let admin = suite.admin.clone();
    let authority = suite.authority.clone();

    assert_eq!(
        suite.execute(&user, add_validator("val1", 1)),
        Err(ChildError::unauthorized(&user))
    );
    // The admin only acts through the batch
    assert_eq!(
        suite.execute(&admin, add_validator("val1", 1)),
        Err(ChildError::unauthorized(&admin))
    );
    suite.execute(&authority, add_validator("val1", 1)).unwrap();
}

// ============================================================================
// Validator Set
// ============================================================================

#[test]
fn test_validator_lifecycle() {
    let mut suite = Suite::new();
    suite.execute_as_admin(vec![add_validator("val1", 1)]).unwrap();

    let block = suite.end_block().unwrap();
    assert_eq!(
        block.validator_updates,
        vec![ValidatorUpdate {
            pubkey: pubkey(1),
            power: 1
        }]
    );
    assert!(suite.end_block().unwrap().validator_updates.is_empty());

    suite
        .execute_as_admin(vec![ExecuteMsg::RemoveValidator {
            operator_address: operator("val1").to_string(),
        }])
        .unwrap();
    // Still queryable until the end block retires it
    let res: ValidatorResponse = suite
        .query(QueryMsg::Validator {
            operator_address: operator("val1").to_string(),
        })
        .unwrap();
    assert_eq!(res.validator.consensus_power, 0);

    let block = suite.end_block().unwrap();
    assert_eq!(
        block.validator_updates,
        vec![ValidatorUpdate {
            pubkey: pubkey(1),
            power: 0
        }]
    );
    assert!(suite
        .query::<ValidatorResponse>(QueryMsg::Validator {
            operator_address: operator("val1").to_string(),
        })
        .is_err());
}

#[test]
fn test_validator_errors() {
    let mut suite = Suite::new();
    suite.execute_as_admin(vec![add_validator("val1", 1)]).unwrap();

    assert_eq!(
        suite.execute_as_admin(vec![add_validator("val2", 1)]),
        Err(ChildError::ValidatorAlreadyExists {
            address: operator("val1").to_string()
        })
    );
    assert_eq!(
        suite.execute_as_admin(vec![ExecuteMsg::AddValidator {
            moniker: "short".to_string(),
            operator_address: operator("short").to_string(),
            consensus_pubkey: Binary::from(vec![9u8; 31]),
        }]),
        Err(ChildError::InvalidPubkey { got: 31 })
    );
    assert_eq!(
        suite.execute_as_admin(vec![ExecuteMsg::RemoveValidator {
            operator_address: operator("ghost").to_string(),
        }]),
        Err(ChildError::ValidatorNotFound {
            address: operator("ghost").to_string()
        })
    );
}

#[test]
fn test_active_set_respects_max_validators() {
    let mut suite = Suite::new();
    let mut params = suite.params();
    params.max_validators = 2;
    suite
        .execute_as_admin(vec![
            ExecuteMsg::UpdateParams { params },
            add_validator("val1", 1),
            add_validator("val2", 2),
            add_validator("val3", 3),
        ])
        .unwrap();

    let block = suite.end_block().unwrap();
    assert_eq!(block.validator_updates.len(), 2);
    assert_eq!(block.events.len(), 2);
    // All three are stored, two are active
    assert_eq!(validators(&suite).validators.len(), 3);

    // The cap cannot drop below the applied set
    let mut params = suite.params();
    params.max_validators = 1;
    assert!(matches!(
        suite.execute_as_admin(vec![ExecuteMsg::UpdateParams { params }]),
        Err(ChildError::InvalidParams { .. })
    ));
}

#[test]
fn test_validators_pagination() {
    let mut suite = Suite::new();
    suite
        .execute_as_admin(vec![
            add_validator("val1", 1),
            add_validator("val2", 2),
            add_validator("val3", 3),
        ])
        .unwrap();

    let first: ValidatorsResponse = suite
        .query(QueryMsg::Validators {
            start_after: None,
            limit: Some(2),
        })
        .unwrap();
    assert_eq!(first.validators.len(), 2);
    let rest: ValidatorsResponse = suite
        .query(QueryMsg::Validators {
            start_after: Some(first.validators[1].operator_address.to_string()),
            limit: None,
        })
        .unwrap();
    assert_eq!(rest.validators.len(), 1);
    assert!(first
        .validators
        .iter()
        .all(|v| v.operator_address != rest.validators[0].operator_address));
}

// ============================================================================
// Params & Bridge Info
// ============================================================================

#[test]
fn test_update_params() {
    let mut suite = Suite::new();
    let new_executor = addr_make(PREFIX, "executor2");
    let mut params = suite.params();
    params.bridge_executors = vec![new_executor.clone()];
    suite
        .execute_as_admin(vec![ExecuteMsg::UpdateParams {
            params: params.clone(),
        }])
        .unwrap();

    let res: ParamsResponse = suite.query(QueryMsg::Params {}).unwrap();
    assert_eq!(res.params, params);
    assert_eq!(res.authority, suite.authority);

    // The old executor lost its rights
    let executor = suite.executor.clone();
    assert_eq!(suite.deposit(1, 10), Err(ChildError::unauthorized(&executor)));

    let mut params = suite.params();
    params.bridge_executors = vec![];
    assert!(matches!(
        suite.execute_as_admin(vec![ExecuteMsg::UpdateParams { params }]),
        Err(ChildError::InvalidParams { .. })
    ));
    let mut params = suite.params();
    params.admin = addr_make("l1", "admin");
    assert!(matches!(
        suite.execute_as_admin(vec![ExecuteMsg::UpdateParams { params }]),
        Err(ChildError::Address(_))
    ));
}

#[test]
fn test_bridge_id_is_immutable() {
    let mut suite = Suite::new();
    let executor = suite.executor.clone();
    let user = suite.user.clone();

    // Other fields may be refreshed
    let mut bridge_info = suite.bridge_info();
    bridge_info.l1_client_id = "07-tendermint-1".to_string();
    suite
        .execute(&executor, ExecuteMsg::SetBridgeInfo { bridge_info })
        .unwrap();

    let mut bridge_info = suite.bridge_info();
    bridge_info.bridge_id = 2;
    assert_eq!(
        suite.execute(&executor, ExecuteMsg::SetBridgeInfo { bridge_info }),
        Err(ChildError::BridgeInfoImmutable { current: 1, got: 2 })
    );

    let bridge_info = suite.bridge_info();
    assert_eq!(
        suite.execute(&user, ExecuteMsg::SetBridgeInfo { bridge_info }),
        Err(ChildError::unauthorized(&user))
    );

    let bridge_info = BridgeInfo {
        l1_chain_id: String::new(),
        ..suite.bridge_info()
    };
    assert!(matches!(
        suite.execute(&executor, ExecuteMsg::SetBridgeInfo { bridge_info }),
        Err(ChildError::InvalidBridgeInfo { .. })
    ));
}
