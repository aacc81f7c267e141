// libnfctag/src/engine/connection.rs

//! Connect, reconnect and disconnect, built on the reselect handshake:
//! optional halt, deactivate to Sleep, select on the new interface, with
//! bounded retries.

use std::time::Duration;

use log::{debug, info, warn};

use crate::engine::EngineInner;
use crate::engine::state::Connection;
use crate::protocol::{halt_frame, is_cashbee};
use crate::tag::TagRecord;
use crate::types::{ConnectionState, DeactivationKind, DiscoveryId, Protocol, RfInterface};
use crate::utils::sync::lock;
use crate::{Error, Result};

/// Where a reselect should land.
#[derive(Debug, Clone, Copy)]
struct Target {
    tag: DiscoveryId,
    handle: DiscoveryId,
    protocol: Protocol,
    interface: RfInterface,
    tech_index: Option<usize>,
}

/// Marks the connection as reselecting for its lifetime, so the event
/// thread does not treat the handshake as discovery or tag loss.
struct Reselecting<'a> {
    engine: &'a EngineInner,
}

impl<'a> Reselecting<'a> {
    fn begin(engine: &'a EngineInner) -> Self {
        lock(&engine.conn).reselecting = true;
        Self { engine }
    }
}

impl Drop for Reselecting<'_> {
    fn drop(&mut self) {
        lock(&self.engine.conn).reselecting = false;
    }
}

impl EngineInner {
    pub(crate) fn connect(&self, tech_index: usize) -> Result<()> {
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        self.connect_locked(tech_index)
    }

    fn connected_record(&self, conn: &Connection) -> Result<TagRecord> {
        conn.tag
            .and_then(|id| self.registry.get(id))
            .ok_or(Error::NotActive)
    }

    fn connect_locked(&self, tech_index: usize) -> Result<()> {
        let conn = self.require_active()?;
        let record = self.connected_record(&conn)?;
        let count = record.tech_count();
        let invalid = Error::InvalidTechIndex {
            index: tech_index,
            count,
        };
        let (Some(interface), Some(handle), Some(protocol)) = (
            record.interface_for(tech_index),
            record.handle(tech_index),
            record.protocol(tech_index),
        ) else {
            return Err(invalid);
        };

        if conn.interface == Some(interface) && conn.handle == Some(handle) {
            debug!("connect {}: already on {}", tech_index, interface);
            self.mark_connected(record.discovery_id(), Some(tech_index));
            return Ok(());
        }

        self.reselect_locked(
            &record,
            Target {
                tag: record.discovery_id(),
                handle,
                protocol,
                interface,
                tech_index: Some(tech_index),
            },
        )
    }

    pub(crate) fn reconnect(&self) -> Result<()> {
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        self.reconnect_locked()
    }

    /// Reselect the current target on the interface its protocol implies.
    pub(crate) fn reconnect_locked(&self) -> Result<()> {
        let conn = self.require_active()?;
        let record = self.connected_record(&conn)?;
        let (Some(handle), Some(protocol)) = (conn.handle, conn.protocol) else {
            return Err(Error::NotActive);
        };
        info!("reconnect {} ({})", handle, protocol);
        self.reselect_locked(
            &record,
            Target {
                tag: record.discovery_id(),
                handle,
                protocol,
                interface: protocol.default_interface(),
                tech_index: conn.tech_index,
            },
        )
    }

    fn mark_connected(&self, tag: DiscoveryId, tech_index: Option<usize>) {
        lock(&self.conn).tech_index = tech_index;
        self.registry.set_connected(tag, tech_index);
    }

    fn reselect_locked(&self, record: &TagRecord, target: Target) -> Result<()> {
        let result = self.reselect_handshake(record, target);
        if result.is_err() && lock(&self.conn).state == ConnectionState::Idle {
            info!("tag {} went idle during reselect", target.tag);
            self.presence.set_field_on(false);
            self.clear_connection();
        }
        result
    }

    fn reselect_handshake(&self, record: &TagRecord, target: Target) -> Result<()> {
        let conn = self.connection();
        if conn.ndef_read_timed_out {
            return Err(Error::Busy("ndef read timed out".into()));
        }
        let (Some(from), Some(protocol), Some(params)) = (conn.interface, conn.protocol, conn.params)
        else {
            return Err(Error::NotActive);
        };
        let origin = (conn.handle, protocol, from);
        let cashbee = is_cashbee(protocol, &params);
        info!(
            "reselect {} -> {} {} on {}{}",
            from,
            target.handle,
            target.protocol,
            target.interface,
            if cashbee { " (cashbee)" } else { "" }
        );

        let _reselecting = Reselecting::begin(self);

        if self.config.needs_halt_frame() && from == RfInterface::Frame {
            if let Some(frame) = halt_frame(protocol, &params) {
                self.send_halt(&frame);
            }
        }

        self.sleep_target(cashbee, from, target.interface)?;

        if self.select_with_retries(target, cashbee)? {
            self.mark_connected(target.tag, target.tech_index);
            debug!("reselect done, now on {}", target.interface);
            return Ok(());
        }

        if record.is_multi_proto_mifare() && target.interface == RfInterface::Mifare {
            return self.fall_back_multi_proto(record, target, origin);
        }

        warn!(
            "reselect to {} failed after {} retries",
            target.interface, self.config.max_select_retries
        );
        self.waiters.abort_all();
        Err(Error::ReselectFailed(target.interface))
    }

    /// Best effort HLTA/HLTB before leaving the frame interface.
    fn send_halt(&self, frame: &[u8]) {
        let waiter = &self.waiters.halt;
        waiter.arm();
        match self.channel.send_raw_frame(frame) {
            Ok(()) => {
                if let Err(e) = waiter.wait(self.config.halt_wait()) {
                    debug!("halt: {}", e);
                }
            }
            Err(e) => {
                waiter.disarm();
                warn!("halt frame not sent: {}", e);
            }
        }
    }

    fn sleep_target(&self, cashbee: bool, from: RfInterface, to: RfInterface) -> Result<()> {
        let waiter = &self.waiters.deactivation;
        waiter.arm();
        let sent = if cashbee {
            self.channel.start_rf_discovery(false)
        } else {
            self.channel.deactivate(true)
        };
        if let Err(e) = sent {
            waiter.disarm();
            return Err(e);
        }
        match waiter.wait_until(self.config.select_wait(), |kind| {
            *kind == DeactivationKind::Sleep || cashbee
        }) {
            Ok(_) => {}
            Err(e @ Error::Aborted { .. }) => return Err(e),
            Err(e) => {
                warn!("no deactivation: {}", e);
                return Err(Error::ProtocolMismatch { from, to });
            }
        }

        let state = lock(&self.conn).state;
        match state {
            ConnectionState::Sleep => Ok(()),
            ConnectionState::Idle if cashbee => Ok(()),
            other => {
                warn!("target in {} instead of SLEEP", other);
                Err(Error::ProtocolMismatch { from, to })
            }
        }
    }

    /// One select plus the configured retries. Returns whether the target
    /// was activated.
    fn select_with_retries(&self, target: Target, cashbee: bool) -> Result<bool> {
        let retries = self.config.max_select_retries;
        for attempt in 0..=retries {
            let wait = if attempt == 0 {
                self.config.select_wait()
            } else {
                self.config.select_retry_wait()
            };
            if self.select_once(target, cashbee, wait)? {
                return Ok(true);
            }
            if attempt == 0 && self.is_multi_proto_mifare_target(target) {
                return Ok(false);
            }
            debug!("select attempt {} failed", attempt + 1);
        }
        Ok(false)
    }

    fn select_once(&self, target: Target, cashbee: bool, wait: Duration) -> Result<bool> {
        let waiter = &self.waiters.activation;
        waiter.arm();
        let sent = if cashbee {
            self.channel.start_rf_discovery(true)
        } else {
            self.channel
                .select(target.handle, target.protocol, target.interface)
        };
        if let Err(e) = sent {
            waiter.disarm();
            warn!("select not sent: {}", e);
            return Ok(false);
        }
        match waiter.wait(wait) {
            Ok(activated) => Ok(activated && lock(&self.conn).is_active()),
            Err(e @ Error::Aborted { .. }) => Err(e),
            Err(_) => Ok(false),
        }
    }

    fn is_multi_proto_mifare_target(&self, target: Target) -> bool {
        target.interface == RfInterface::Mifare
            && self
                .registry
                .get(target.tag)
                .is_some_and(|r| r.is_multi_proto_mifare())
    }

    /// An ISO-DEP + Mifare tag refused the Mifare interface: go back to the
    /// original interface and let the NDEF layer skip the tag.
    fn fall_back_multi_proto(
        &self,
        record: &TagRecord,
        target: Target,
        origin: (Option<DiscoveryId>, Protocol, RfInterface),
    ) -> Result<()> {
        {
            let mut quirks = lock(&self.quirks);
            quirks.multi_proto_mifare = true;
            quirks.skip_ndef_read = true;
        }
        let (Some(handle), protocol, interface) = origin else {
            return Err(Error::ReselectFailed(target.interface));
        };
        info!("multi-protocol mifare: restoring {} on {}", handle, interface);
        let restore = Target {
            handle,
            protocol,
            interface,
            ..target
        };
        if self.select_once(restore, false, self.config.select_wait())? {
            self.mark_connected(target.tag, record.index_for(handle, interface));
            return Ok(());
        }
        self.waiters.abort_all();
        Err(Error::ReselectFailed(interface))
    }

    /// Release the tag. The record goes away whatever the controller says.
    pub(crate) fn disconnect(&self) -> bool {
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        self.release();
        true
    }

    /// Presence watchdog path; the watchdog cannot pause itself.
    pub(crate) fn disconnect_lost(&self) {
        let _rf = lock(&self.rf_lock);
        self.release();
    }

    fn release(&self) {
        if let Err(e) = self.channel.deactivate(false) {
            warn!("deactivate on disconnect: {}", e);
        }
        self.presence.set_field_on(false);
        self.clear_connection();
    }
}
