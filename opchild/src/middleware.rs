//! IBC middleware converting migrated vouchers into their L2 denom.
//!
//! Once a denom migrates to IBC, the host forwards its deposits as ICS-20
//! transfers. The vouchers those transfers mint on this chain are swapped
//! for the L2 denom the bridge used to mint, so holders keep a single denom.

use cosmwasm_std::{from_json, Addr, Coin, Env, Event, Storage};
use opinit_common::ibc::{
    ibc_denom, prefixed_denom, receiver_chain_is_source, Acknowledgement, FungibleTokenPacketData,
    IbcModule, Packet, RecvPacketOutcome,
};
use opinit_common::{address, Bank, CacheStore};
use tracing::{debug, info, warn};

use crate::keeper::load_params;
use crate::state::IBC_TO_L2_DENOMS;

/// Wraps the transfer application of the migration channels.
pub struct MigrationMiddleware<'a> {
    pub app: &'a dyn IbcModule,
    pub bank: &'a dyn Bank,
}

/// A packet the middleware converts
struct Migration {
    receiver: Addr,
    ibc_denom: String,
    l2_denom: String,
}

impl<'a> MigrationMiddleware<'a> {
    pub fn new(app: &'a dyn IbcModule, bank: &'a dyn Bank) -> Self {
        Self { app, bank }
    }

    /// Resolve the conversion a packet needs, if any.
    fn migration(&self, store: &dyn Storage, packet: &Packet) -> Option<Migration> {
        let data: FungibleTokenPacketData = from_json(&packet.data).ok()?;
        if receiver_chain_is_source(&packet.source_port, &packet.source_channel, &data.denom) {
            return None;
        }
        let voucher = ibc_denom(&prefixed_denom(
            &packet.destination_port,
            &packet.destination_channel,
            &data.denom,
        ));
        let l2_denom = IBC_TO_L2_DENOMS.may_load(store, &voucher).ok()??;
        let params = load_params(store).ok()?;
        let receiver = address::validate(&params.bech32_prefix, &data.receiver).ok()?;
        Some(Migration {
            receiver,
            ibc_denom: voucher,
            l2_denom,
        })
    }

    fn convert(
        &self,
        store: &mut dyn Storage,
        env: &Env,
        packet: &Packet,
        relayer: &Addr,
        migration: Migration,
    ) -> RecvPacketOutcome {
        let mut cache = CacheStore::new(store);
        let before = match self
            .bank
            .balance(&cache, &migration.receiver, &migration.ibc_denom)
        {
            Ok(balance) => balance,
            Err(err) => return RecvPacketOutcome::new(Acknowledgement::error(err)),
        };

        let outcome = self.app.on_recv_packet(&mut cache, env, packet, relayer);
        if !outcome.acknowledgement.is_success() {
            return outcome;
        }

        let after = match self
            .bank
            .balance(&cache, &migration.receiver, &migration.ibc_denom)
        {
            Ok(balance) => balance,
            Err(err) => return RecvPacketOutcome::new(Acknowledgement::error(err)),
        };
        let delta = after.saturating_sub(before);
        if delta.is_zero() {
            cache.commit();
            return outcome;
        }

        let burned = Coin::new(delta.u128(), &migration.ibc_denom);
        let minted = Coin::new(delta.u128(), &migration.l2_denom);
        let swapped = self
            .bank
            .burn(&mut cache, &migration.receiver, &[burned])
            .and_then(|()| self.bank.mint(&mut cache, &migration.receiver, &[minted]));
        if let Err(err) = swapped {
            warn!(error = %err, ibc_denom = %migration.ibc_denom, "migrated deposit conversion failed");
            return RecvPacketOutcome::new(Acknowledgement::error(err));
        }
        cache.commit();

        info!(
            receiver = %migration.receiver,
            denom = %migration.l2_denom,
            amount = %delta,
            "migrated token deposit converted"
        );

        outcome.add_event(
            Event::new("handle_migrated_token_deposit")
                .add_attribute("receiver", migration.receiver)
                .add_attribute("ibc_denom", migration.ibc_denom)
                .add_attribute("denom", migration.l2_denom)
                .add_attribute("amount", delta.to_string()),
        )
    }
}

impl IbcModule for MigrationMiddleware<'_> {
    fn on_recv_packet(
        &self,
        store: &mut dyn Storage,
        env: &Env,
        packet: &Packet,
        relayer: &Addr,
    ) -> RecvPacketOutcome {
        match self.migration(store, packet) {
            Some(migration) => self.convert(store, env, packet, relayer, migration),
            None => {
                debug!(
                    channel = %packet.destination_channel,
                    sequence = packet.sequence,
                    "packet passed through"
                );
                self.app.on_recv_packet(store, env, packet, relayer)
            }
        }
    }
}
