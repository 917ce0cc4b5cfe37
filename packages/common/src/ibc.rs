//! ICS-20 types and the IBC collaborator interfaces.
//!
//! Channel lifecycle, light clients and packet relay belong to the host
//! platform. The bridges only consume three narrow seams:
//! - [`TransferRouter`] - dispatch an ICS-20 transfer (host deposit forwarding)
//! - [`ChannelKeeper`] - capability lookup and raw packet sends (attestor set)
//! - [`IbcModule`] - packet receipt, wrapped by the child migration middleware

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Coin, Env, Event, StdResult, Storage};

use crate::hash::sha256;

/// ICS-20 packet payload
#[cw_serde]
pub struct FungibleTokenPacketData {
    pub denom: String,
    /// Decimal string
    pub amount: String,
    pub sender: String,
    pub receiver: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memo: String,
}

/// ICS-20 transfer request
#[cw_serde]
pub struct TransferMsg {
    pub source_port: String,
    pub source_channel: String,
    pub token: Coin,
    pub sender: String,
    pub receiver: String,
    /// Unix nanoseconds, 0 for none
    pub timeout_timestamp: u64,
    pub memo: String,
}

#[cw_serde]
pub struct Packet {
    pub sequence: u64,
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    pub data: Binary,
    pub timeout_timestamp: u64,
}

/// Standard ICS-04 acknowledgement, JSON encoded as `{"result": ...}` or `{"error": ...}`
#[cw_serde]
pub enum Acknowledgement {
    Result(Binary),
    Error(String),
}

impl Acknowledgement {
    pub fn success() -> Self {
        Acknowledgement::Result(Binary::from(vec![1u8]))
    }

    pub fn error(reason: impl ToString) -> Self {
        Acknowledgement::Error(reason.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Acknowledgement::Result(_))
    }
}

/// Acknowledgement plus the events the receiving application emitted
#[derive(Debug, Clone, PartialEq)]
pub struct RecvPacketOutcome {
    pub acknowledgement: Acknowledgement,
    pub events: Vec<Event>,
}

impl RecvPacketOutcome {
    pub fn new(acknowledgement: Acknowledgement) -> Self {
        Self {
            acknowledgement,
            events: vec![],
        }
    }

    pub fn add_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }
}

/// Proof of ownership over a channel end, issued by the host
#[cw_serde]
pub struct ChannelCapability {
    pub index: u64,
    pub name: String,
}

impl ChannelCapability {
    pub fn channel_name(port_id: &str, channel_id: &str) -> String {
        format!("capabilities/ports/{}/channels/{}", port_id, channel_id)
    }
}

pub trait TransferRouter {
    /// Execute an ICS-20 transfer and return the events it emitted.
    fn transfer(&self, store: &mut dyn Storage, env: &Env, msg: TransferMsg) -> StdResult<Vec<Event>>;
}

pub trait ChannelKeeper {
    fn get_capability(
        &self,
        store: &dyn Storage,
        port_id: &str,
        channel_id: &str,
    ) -> Option<ChannelCapability>;

    fn next_sequence_send(&self, store: &dyn Storage, port_id: &str, channel_id: &str) -> Option<u64>;

    /// Send a packet, returning the sequence it was assigned.
    fn send_packet(
        &self,
        store: &mut dyn Storage,
        capability: &ChannelCapability,
        port_id: &str,
        channel_id: &str,
        timeout_timestamp: u64,
        data: Binary,
    ) -> StdResult<u64>;
}

pub trait IbcModule {
    fn on_recv_packet(
        &self,
        store: &mut dyn Storage,
        env: &Env,
        packet: &Packet,
        relayer: &Addr,
    ) -> RecvPacketOutcome;
}

/// Prefix a denom with the channel end it arrived through.
pub fn prefixed_denom(port_id: &str, channel_id: &str, denom: &str) -> String {
    format!("{}/{}/{}", port_id, channel_id, denom)
}

/// Whether a token sent from `source_port/source_channel` is returning to its origin.
pub fn receiver_chain_is_source(source_port: &str, source_channel: &str, denom: &str) -> bool {
    denom.starts_with(&format!("{}/{}/", source_port, source_channel))
}

/// Voucher denom for a full denom trace: `ibc/<UPPER_HEX(SHA-256(trace))>`.
///
/// A trace without a path is a native denom and is returned unchanged.
pub fn ibc_denom(trace: &str) -> String {
    if !trace.contains('/') {
        return trace.to_string();
    }
    format!("ibc/{}", hex::encode_upper(sha256(trace.as_bytes())))
}
