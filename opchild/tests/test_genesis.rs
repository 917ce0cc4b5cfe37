//! Genesis export of a live child and re-import into a fresh store.

mod common;

use cosmwasm_std::testing::MockStorage;
use cosmwasm_std::{Binary, Coin, Order, Storage};
use opchild::genesis::{export_genesis, init_genesis};
use opchild::msg::{ExecuteMsg, QueryMsg, SequenceResponse};
use opchild::state::MigrationInfo;
use opchild::ChildError;
use opinit_common::testing::addr_make;

use common::{Suite, PREFIX};

fn populated_suite() -> Suite {
    let mut suite = Suite::new();
    let denom = suite.denom();
    let user = suite.user.clone();

    suite.deposit(1, 100).unwrap();
    suite.deposit(4, 5).unwrap();
    suite
        .execute(
            &user,
            ExecuteMsg::Withdraw {
                to: addr_make("l1", "receiver").to_string(),
                amount: Coin::new(10, &denom),
            },
        )
        .unwrap();
    suite
        .execute_as_admin(vec![
            ExecuteMsg::AddValidator {
                moniker: "val1".to_string(),
                operator_address: addr_make(PREFIX, "val1").to_string(),
                consensus_pubkey: Binary::from(vec![1u8; 32]),
            },
            ExecuteMsg::RegisterMigrationInfo {
                migration_info: MigrationInfo {
                    denom,
                    ibc_port_id: "transfer".to_string(),
                    ibc_channel_id: "channel-0".to_string(),
                },
            },
        ])
        .unwrap();
    suite.end_block().unwrap();
    suite
}

#[test]
fn test_export_import_roundtrip() {
    let suite = populated_suite();
    let genesis = export_genesis(&suite.storage).unwrap();
    assert_eq!(genesis.finalized_l1_sequences, vec![1, 4]);
    assert_eq!(genesis.next_l2_sequence, 2);
    assert_eq!(genesis.validators.len(), 1);
    assert_eq!(genesis.last_validator_powers.len(), 1);
    assert_eq!(genesis.migration_infos.len(), 1);

    let mut storage = MockStorage::new();
    init_genesis(&mut storage, &genesis).unwrap();
    assert_eq!(export_genesis(&storage).unwrap(), genesis);
}

#[test]
fn test_imported_child_keeps_running() {
    let suite = populated_suite();
    let genesis = export_genesis(&suite.storage).unwrap();

    let mut fresh = Suite::new();
    fresh.storage = MockStorage::new();
    init_genesis(&mut fresh.storage, &genesis).unwrap();

    // Credited sequences stay credited, the L2 counter continues
    let res = fresh.deposit(1, 100).unwrap();
    assert!(res.events.is_empty());
    let res: SequenceResponse = fresh.query(QueryMsg::NextL2Sequence {}).unwrap();
    assert_eq!(res.sequence, 2);
    // The applied set matches, so there is nothing to report
    assert!(fresh.end_block().unwrap().validator_updates.is_empty());
}

#[test]
fn test_import_validation() {
    let suite = populated_suite();
    let mut genesis = export_genesis(&suite.storage).unwrap();
    genesis.params.max_validators = 0;
    let mut storage = MockStorage::new();
    assert!(matches!(
        init_genesis(&mut storage, &genesis),
        Err(ChildError::InvalidParams { .. })
    ));

    genesis.params.max_validators = 1;
    genesis.next_l2_sequence = 0;
    let mut storage = MockStorage::new();
    assert_eq!(
        init_genesis(&mut storage, &genesis),
        Err(ChildError::InvalidSequence)
    );
}

#[test]
fn test_rejected_import_leaves_store_empty() {
    let suite = populated_suite();
    let mut genesis = export_genesis(&suite.storage).unwrap();
    // Migrations are imported last, after every other entry was written
    genesis.migration_infos[0].denom = "l2/unknown".to_string();

    let mut storage = MockStorage::new();
    assert_eq!(
        init_genesis(&mut storage, &genesis),
        Err(ChildError::TokenPairNotFound {
            denom: "l2/unknown".to_string()
        })
    );
    assert!(storage.range(None, None, Order::Ascending).next().is_none());
}
