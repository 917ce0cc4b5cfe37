//! Test doubles for the host platform collaborators.
//!
//! Enabled with the `testing` feature and used by the integration tests of
//! both bridges.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use cosmwasm_std::{
    from_json, Addr, Binary, Coin, Env, Event, StdError, StdResult, Storage, Uint128,
};

use crate::address;
use crate::bank::{Bank, StoreBank};
use crate::hash::sha256;
use crate::ibc::{
    ibc_denom, prefixed_denom, receiver_chain_is_source, Acknowledgement, ChannelCapability,
    ChannelKeeper, FungibleTokenPacketData, IbcModule, Packet, RecvPacketOutcome, TransferMsg,
    TransferRouter,
};

/// Deterministic bech32 address for a human-readable label.
pub fn addr_make(prefix: &str, label: &str) -> Addr {
    let digest = sha256(label.as_bytes());
    address::encode(prefix, &digest[..20]).expect("valid test prefix")
}

/// Transfer router that escrows into the ICS-20 escrow account and records every request.
pub struct MockTransferRouter {
    pub prefix: String,
    pub bank: StoreBank,
    pub transfers: RefCell<Vec<TransferMsg>>,
}

impl MockTransferRouter {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            bank: StoreBank,
            transfers: RefCell::new(vec![]),
        }
    }
}

impl TransferRouter for MockTransferRouter {
    fn transfer(&self, store: &mut dyn Storage, _env: &Env, msg: TransferMsg) -> StdResult<Vec<Event>> {
        let escrow = address::ics20_escrow_address(&self.prefix, &msg.source_port, &msg.source_channel)
            .map_err(|e| StdError::generic_err(e.to_string()))?;
        let sender = Addr::unchecked(&msg.sender);
        self.bank
            .send(store, &sender, &escrow, &[msg.token.clone()])
            .map_err(|e| StdError::generic_err(e.to_string()))?;

        let event = Event::new("ibc_transfer")
            .add_attribute("sender", &msg.sender)
            .add_attribute("receiver", &msg.receiver)
            .add_attribute("denom", &msg.token.denom)
            .add_attribute("amount", msg.token.amount.to_string())
            .add_attribute("memo", &msg.memo);
        self.transfers.borrow_mut().push(msg);
        Ok(vec![event])
    }
}

/// A packet handed to [`MockChannelKeeper::send_packet`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentPacket {
    pub port_id: String,
    pub channel_id: String,
    pub sequence: u64,
    pub timeout_timestamp: u64,
    pub data: Binary,
}

/// Channel keeper with a fixed set of open channels.
#[derive(Default)]
pub struct MockChannelKeeper {
    pub open_channels: Vec<(String, String)>,
    next_sequences: RefCell<BTreeMap<(String, String), u64>>,
    pub sent: RefCell<Vec<SentPacket>>,
}

impl MockChannelKeeper {
    pub fn with_channel(port_id: &str, channel_id: &str) -> Self {
        Self {
            open_channels: vec![(port_id.to_string(), channel_id.to_string())],
            ..Default::default()
        }
    }

    fn is_open(&self, port_id: &str, channel_id: &str) -> bool {
        self.open_channels
            .iter()
            .any(|(p, c)| p == port_id && c == channel_id)
    }
}

impl ChannelKeeper for MockChannelKeeper {
    fn get_capability(
        &self,
        _store: &dyn Storage,
        port_id: &str,
        channel_id: &str,
    ) -> Option<ChannelCapability> {
        let index = self
            .open_channels
            .iter()
            .position(|(p, c)| p == port_id && c == channel_id)?;
        Some(ChannelCapability {
            index: index as u64,
            name: ChannelCapability::channel_name(port_id, channel_id),
        })
    }

    fn next_sequence_send(&self, _store: &dyn Storage, port_id: &str, channel_id: &str) -> Option<u64> {
        if !self.is_open(port_id, channel_id) {
            return None;
        }
        let key = (port_id.to_string(), channel_id.to_string());
        Some(*self.next_sequences.borrow().get(&key).unwrap_or(&1))
    }

    fn send_packet(
        &self,
        _store: &mut dyn Storage,
        capability: &ChannelCapability,
        port_id: &str,
        channel_id: &str,
        timeout_timestamp: u64,
        data: Binary,
    ) -> StdResult<u64> {
        if capability.name != ChannelCapability::channel_name(port_id, channel_id) {
            return Err(StdError::generic_err("capability does not own channel"));
        }
        let key = (port_id.to_string(), channel_id.to_string());
        let mut sequences = self.next_sequences.borrow_mut();
        let sequence = *sequences.get(&key).unwrap_or(&1);
        sequences.insert(key, sequence + 1);

        self.sent.borrow_mut().push(SentPacket {
            port_id: port_id.to_string(),
            channel_id: channel_id.to_string(),
            sequence,
            timeout_timestamp,
            data,
        });
        Ok(sequence)
    }
}

/// Minimal ICS-20 receiving application: mints vouchers or releases escrow.
pub struct MockTransferApp {
    pub prefix: String,
    pub bank: StoreBank,
    /// Force the next receipts to fail
    pub fail: Cell<bool>,
}

impl MockTransferApp {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            bank: StoreBank,
            fail: Cell::new(false),
        }
    }

    fn receive(&self, store: &mut dyn Storage, packet: &Packet) -> StdResult<()> {
        if self.fail.get() {
            return Err(StdError::generic_err("transfer app failure"));
        }
        let data: FungibleTokenPacketData = from_json(&packet.data)?;
        let amount: Uint128 = data
            .amount
            .parse()
            .map_err(|_| StdError::generic_err("invalid amount"))?;
        let receiver = address::validate(&self.prefix, &data.receiver)
            .map_err(|e| StdError::generic_err(e.to_string()))?;

        if receiver_chain_is_source(&packet.source_port, &packet.source_channel, &data.denom) {
            let prefix = format!("{}/{}/", packet.source_port, packet.source_channel);
            let base = data.denom.trim_start_matches(&prefix).to_string();
            let escrow = address::ics20_escrow_address(
                &self.prefix,
                &packet.destination_port,
                &packet.destination_channel,
            )
            .map_err(|e| StdError::generic_err(e.to_string()))?;
            self.bank
                .send(store, &escrow, &receiver, &[Coin::new(amount.u128(), ibc_denom(&base))])
                .map_err(|e| StdError::generic_err(e.to_string()))?;
        } else {
            let trace = prefixed_denom(&packet.destination_port, &packet.destination_channel, &data.denom);
            self.bank
                .mint(store, &receiver, &[Coin::new(amount.u128(), ibc_denom(&trace))])
                .map_err(|e| StdError::generic_err(e.to_string()))?;
        }
        Ok(())
    }
}

impl IbcModule for MockTransferApp {
    fn on_recv_packet(
        &self,
        store: &mut dyn Storage,
        _env: &Env,
        packet: &Packet,
        _relayer: &Addr,
    ) -> RecvPacketOutcome {
        match self.receive(store, packet) {
            Ok(()) => RecvPacketOutcome::new(Acknowledgement::success())
                .add_event(Event::new("fungible_token_packet").add_attribute("success", "true")),
            Err(err) => RecvPacketOutcome::new(Acknowledgement::error(err)),
        }
    }
}
