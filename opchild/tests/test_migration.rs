//! Migration registration and voucher conversion tests.

mod common;

use cosmwasm_std::{to_json_binary, Addr, Uint128};
use opchild::msg::{ExecuteMsg, MigrationInfoResponse, QueryMsg};
use opchild::state::MigrationInfo;
use opchild::{ChildError, MigrationMiddleware};
use opinit_common::ibc::{ibc_denom, FungibleTokenPacketData, IbcModule, Packet};
use opinit_common::testing::{addr_make, MockTransferApp};

use common::{Suite, BASE_DENOM, PREFIX};

const PORT: &str = "transfer";
const CHANNEL: &str = "channel-0";

fn migration_info(denom: &str) -> MigrationInfo {
    MigrationInfo {
        denom: denom.to_string(),
        ibc_port_id: PORT.to_string(),
        ibc_channel_id: CHANNEL.to_string(),
    }
}

/// Suite with the bridge denom known and migrated to `transfer/channel-0`.
fn migrated_suite() -> Suite {
    let mut suite = Suite::new();
    suite.deposit(1, 100).unwrap();
    let denom = suite.denom();
    suite
        .execute_as_admin(vec![ExecuteMsg::RegisterMigrationInfo {
            migration_info: migration_info(&denom),
        }])
        .unwrap();
    suite
}

fn packet(receiver: &Addr, denom: &str, amount: u128, destination_channel: &str) -> Packet {
    let data = FungibleTokenPacketData {
        denom: denom.to_string(),
        amount: amount.to_string(),
        sender: addr_make("l1", "sender").to_string(),
        receiver: receiver.to_string(),
        memo: String::new(),
    };
    Packet {
        sequence: 1,
        source_port: PORT.to_string(),
        source_channel: "channel-7".to_string(),
        destination_port: PORT.to_string(),
        destination_channel: destination_channel.to_string(),
        data: to_json_binary(&data).unwrap(),
        timeout_timestamp: 0,
    }
}

#[test]
fn test_register_migration_info() {
    let suite = migrated_suite();
    let denom = suite.denom();

    let res: MigrationInfoResponse = suite
        .query(QueryMsg::MigrationInfo {
            denom: denom.clone(),
        })
        .unwrap();
    assert_eq!(res.migration_info, migration_info(&denom));
    assert_eq!(
        res.ibc_denom,
        ibc_denom(&format!("{}/{}/{}", PORT, CHANNEL, BASE_DENOM))
    );
}

#[test]
fn test_register_migration_info_errors() {
    let mut suite = migrated_suite();
    let denom = suite.denom();

    assert_eq!(
        suite.execute_as_admin(vec![ExecuteMsg::RegisterMigrationInfo {
            migration_info: migration_info(&denom),
        }]),
        Err(ChildError::MigrationInfoAlreadyRegistered {
            denom: denom.clone()
        })
    );
    assert_eq!(
        suite.execute_as_admin(vec![ExecuteMsg::RegisterMigrationInfo {
            migration_info: migration_info("l2/unknown"),
        }]),
        Err(ChildError::TokenPairNotFound {
            denom: "l2/unknown".to_string()
        })
    );
    let mut empty_channel = migration_info(&denom);
    empty_channel.ibc_channel_id = String::new();
    assert!(matches!(
        suite.execute_as_admin(vec![ExecuteMsg::RegisterMigrationInfo {
            migration_info: empty_channel,
        }]),
        Err(ChildError::InvalidMigrationInfo { .. })
    ));

    let user = suite.user.clone();
    assert_eq!(
        suite.execute(
            &user,
            ExecuteMsg::RegisterMigrationInfo {
                migration_info: migration_info(&denom),
            }
        ),
        Err(ChildError::unauthorized(&user))
    );
}

#[test]
fn test_migrated_vouchers_convert() {
    let mut suite = migrated_suite();
    let denom = suite.denom();
    let receiver = addr_make(PREFIX, "ibc-receiver");
    let voucher = ibc_denom(&format!("{}/{}/{}", PORT, CHANNEL, BASE_DENOM));

    let app = MockTransferApp::new(PREFIX);
    let middleware = MigrationMiddleware::new(&app, &suite.bank);
    let relayer = addr_make(PREFIX, "relayer");
    let outcome = middleware.on_recv_packet(
        &mut suite.storage,
        &suite.env,
        &packet(&receiver, BASE_DENOM, 50, CHANNEL),
        &relayer,
    );

    assert!(outcome.acknowledgement.is_success());
    let converted = outcome
        .events
        .iter()
        .find(|event| event.ty == "handle_migrated_token_deposit")
        .unwrap();
    assert!(converted
        .attributes
        .iter()
        .any(|attr| attr.key == "amount" && attr.value == "50"));

    assert_eq!(suite.balance(&receiver, &voucher), Uint128::zero());
    assert_eq!(suite.balance(&receiver, &denom), Uint128::new(50));
    assert_eq!(suite.supply(&voucher), Uint128::zero());
    // Deposit of 100 plus the converted 50
    assert_eq!(suite.supply(&denom), Uint128::new(150));
}

#[test]
fn test_unmapped_packets_pass_through() {
    let mut suite = migrated_suite();
    let denom = suite.denom();
    let receiver = addr_make(PREFIX, "ibc-receiver");
    let app = MockTransferApp::new(PREFIX);
    let middleware = MigrationMiddleware::new(&app, &suite.bank);
    let relayer = addr_make(PREFIX, "relayer");

    // Another channel mints an unrelated voucher
    let outcome = middleware.on_recv_packet(
        &mut suite.storage,
        &suite.env,
        &packet(&receiver, BASE_DENOM, 20, "channel-9"),
        &relayer,
    );
    assert!(outcome.acknowledgement.is_success());
    assert!(outcome
        .events
        .iter()
        .all(|event| event.ty != "handle_migrated_token_deposit"));
    let voucher = ibc_denom(&format!("{}/channel-9/{}", PORT, BASE_DENOM));
    assert_eq!(suite.balance(&receiver, &voucher), Uint128::new(20));
    assert_eq!(suite.balance(&receiver, &denom), Uint128::zero());

    // Returning tokens are never converted; with no escrow the app rejects them
    let returning = format!("{}/channel-7/{}", PORT, BASE_DENOM);
    let outcome = middleware.on_recv_packet(
        &mut suite.storage,
        &suite.env,
        &packet(&receiver, &returning, 20, CHANNEL),
        &relayer,
    );
    assert!(!outcome.acknowledgement.is_success());
    assert_eq!(suite.balance(&receiver, &denom), Uint128::zero());
}

#[test]
fn test_failed_receipt_is_not_converted() {
    let mut suite = migrated_suite();
    let denom = suite.denom();
    let receiver = addr_make(PREFIX, "ibc-receiver");
    let app = MockTransferApp::new(PREFIX);
    app.fail.set(true);
    let middleware = MigrationMiddleware::new(&app, &suite.bank);
    let relayer = addr_make(PREFIX, "relayer");

    let outcome = middleware.on_recv_packet(
        &mut suite.storage,
        &suite.env,
        &packet(&receiver, BASE_DENOM, 50, CHANNEL),
        &relayer,
    );
    assert!(!outcome.acknowledgement.is_success());
    assert!(outcome.events.is_empty());
    assert_eq!(suite.balance(&receiver, &denom), Uint128::zero());
}

#[test]
fn test_migration_info_query_missing() {
    let suite = Suite::new();
    let denom = suite.denom();
    assert!(suite
        .query::<MigrationInfoResponse>(QueryMsg::MigrationInfo { denom })
        .is_err());
}
