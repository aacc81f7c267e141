// libnfctag/src/engine/events.rs

//! Event-thread side of the engine. Every connection state transition
//! happens here, on a confirmed hardware event.

use log::{debug, error, info, trace, warn};

use crate::discovery::{Aggregation, Selection};
use crate::engine::EngineInner;
use crate::engine::state::QuirkFlags;
use crate::engine::waiter::RxFrame;
use crate::protocol::fwi_timeout_ms;
use crate::transport::{ActivationNotification, EventSink, HardwareEvent};
use crate::types::{
    ConnectionState, DataStatus, DeactivationKind, NfcStatus, RfInterface, RfTechMode, Technology,
};
use crate::utils::sync::{lock, write};

impl EventSink for EngineInner {
    fn on_event(&self, event: HardwareEvent) {
        trace!("event: {:?}", event);
        match event {
            HardwareEvent::Discovery(notification) => {
                let action = {
                    let mut d = lock(&self.discovery);
                    match d.aggregator.on_notification(notification) {
                        Aggregation::Resolved(batch) => {
                            d.pending = None;
                            d.sequencer.select_first(batch).map(|s| {
                                let candidate = d.sequencer.candidate(s.index()).cloned();
                                (s, candidate)
                            })
                        }
                        Aggregation::Pending | Aggregation::Ignored => None,
                    }
                };
                match action {
                    Some((Selection::Replay { .. }, Some(candidate))) => {
                        debug!("discovery: replaying {}", candidate.discovery_id);
                        self.on_activated(ActivationNotification {
                            discovery_id: candidate.discovery_id,
                            protocol: candidate.protocol,
                            interface: candidate.protocol.default_interface(),
                            params: candidate.params,
                            activation_bytes: Vec::new(),
                        });
                    }
                    Some((selection, _)) => self.issue_selection(selection),
                    None => {}
                }
            }
            HardwareEvent::Activated(activation) => self.on_activated(activation),
            HardwareEvent::Deactivated(kind) => self.on_deactivated(kind),
            HardwareEvent::SelectResult(status) => self.on_select_result(status),
            HardwareEvent::Data { status, bytes } => self.on_data(status, bytes),
            HardwareEvent::PresenceCheck { present } => {
                self.waiters.presence.notify(present);
            }
            HardwareEvent::NdefDetected(result) => {
                debug!("ndef detected: {:?}", result);
                *lock(&self.ndef_cache) = result;
                self.waiters.detect.notify(());
            }
            HardwareEvent::NdefRead { status, data } => {
                self.waiters.read.notify((status, data));
            }
            HardwareEvent::NdefWritten(status) => {
                self.waiters.write.notify(status);
            }
            HardwareEvent::Formatted(status) => {
                self.waiters.format.notify(status);
            }
            HardwareEvent::ReadOnly(status) => {
                self.waiters.read_only.notify(status);
            }
            HardwareEvent::RfDiscovery { started, status } => {
                debug!("rf discovery started={} status={}", started, status);
            }
        }
    }
}

impl EngineInner {
    fn issue_selection(&self, selection: Selection) {
        let Selection::Select {
            id,
            protocol,
            interface,
            ..
        } = selection
        else {
            return;
        };
        debug!("select {} {} on {}", id, protocol, interface);
        if let Err(e) = self.channel.select(id, protocol, interface) {
            warn!("select {} failed: {}", id, e);
            self.abandon_round();
        }
    }

    /// Give up the current round: drop what was collected and release the
    /// target.
    fn abandon_round(&self) {
        lock(&self.discovery).reset();
        if let Err(e) = self.channel.deactivate(false) {
            error!("deactivate after failed select: {}", e);
        }
    }

    fn on_activated(&self, activation: ActivationNotification) {
        let reselecting = {
            let mut conn = lock(&self.conn);
            conn.state = ConnectionState::Active;
            conn.handle = Some(activation.discovery_id);
            conn.interface = Some(activation.interface);
            conn.protocol = Some(activation.protocol);
            conn.params = Some(activation.params.clone());
            conn.ndef_read_timed_out = false;
            conn.reselecting
        };
        debug!(
            "activated {} {} on {}",
            activation.discovery_id, activation.protocol, activation.interface
        );

        if activation.interface == RfInterface::IsoDep
            && activation.params.mode() == RfTechMode::PollA
        {
            if let Some(timeout) = fwi_timeout_ms(&activation.activation_bytes) {
                debug!("iso-dep timeout from FWI: {} ms", timeout);
                write(&self.timeouts).set_tech(Technology::IsoDep, timeout);
            }
        }

        self.waiters.activation.notify(true);
        if reselecting {
            return;
        }
        self.collect_activation(&activation);
    }

    /// Discovery path: add the activation to the pending record, then either
    /// walk to the next candidate of the same tag or publish.
    fn collect_activation(&self, activation: &ActivationNotification) {
        let mut d = lock(&self.discovery);
        let uid = activation.params.uid();
        let skipped = d.sequencer.skipped_for(&uid);
        let builder = d.pending.get_or_insert_with(Default::default);
        builder.push_activation(activation);
        for candidate in &skipped {
            builder.push_discovery(candidate);
        }

        if d.sequencer.has_next_for_same_tag() {
            drop(d);
            debug!("tag {} has more protocols, sleeping it", uid.to_hex());
            if let Err(e) = self.channel.deactivate(true) {
                warn!("deactivate to sleep failed: {}", e);
                self.abandon_round();
            }
            return;
        }

        let Some(builder) = d.pending.take() else {
            return;
        };
        drop(d);
        match builder.build() {
            Ok(record) => self.publish(record),
            Err(e) => {
                warn!("discarding activation: {}", e);
                self.abandon_round();
            }
        }
    }

    fn publish(&self, mut record: crate::tag::TagRecord) {
        let id = record.discovery_id();
        let (handle, interface) = {
            let conn = lock(&self.conn);
            (conn.handle, conn.interface)
        };
        let index = match (handle, interface) {
            (Some(h), Some(i)) => record.index_for(h, i),
            _ => None,
        };
        record.connected_tech_index = index;
        {
            let mut conn = lock(&self.conn);
            conn.tag = Some(id);
            conn.tech_index = index;
        }
        *lock(&self.quirks) = QuirkFlags::default();
        self.registry.insert(record);
        self.registry.set_connected(id, index);
        self.presence.set_field_on(true);
        self.registry.publish(id);
    }

    fn on_deactivated(&self, kind: DeactivationKind) {
        let reselecting = {
            let mut conn = lock(&self.conn);
            conn.state = match kind {
                DeactivationKind::Sleep => ConnectionState::Sleep,
                DeactivationKind::Idle | DeactivationKind::Discovery => ConnectionState::Idle,
            };
            conn.reselecting
        };
        debug!("deactivated to {}", kind);
        self.waiters.deactivation.notify(kind);
        if reselecting {
            return;
        }

        if kind == DeactivationKind::Sleep {
            let next = {
                let mut d = lock(&self.discovery);
                if d.sequencer.has_next() {
                    d.sequencer.select_next()
                } else {
                    None
                }
            };
            if let Some(selection) = next {
                self.issue_selection(selection);
            }
            return;
        }

        lock(&self.discovery).reset();
        let tag = lock(&self.conn).tag;
        if let Some(id) = tag {
            info!("tag {} deactivated to {}", id, kind);
        }
        self.presence.set_field_on(false);
        self.clear_connection();
    }

    fn on_select_result(&self, status: NfcStatus) {
        if status.is_ok() {
            return;
        }
        warn!("select answered {}", status);
        let reselecting = lock(&self.conn).reselecting;
        if reselecting {
            self.waiters.activation.notify(false);
        } else {
            self.abandon_round();
        }
    }

    fn on_data(&self, status: DataStatus, bytes: Vec<u8>) {
        if self.waiters.halt.notify(()) {
            return;
        }
        let accepted = self.waiters.transceive.with_pending(|pending| {
            let frame = pending.get_or_insert_with(RxFrame::default);
            frame.bytes.extend_from_slice(&bytes);
            match status {
                DataStatus::Continue => {}
                DataStatus::Final => frame.complete = true,
                DataStatus::Failed => {
                    frame.complete = true;
                    frame.failed = true;
                }
            }
        });
        if !accepted {
            trace!("unsolicited data dropped ({} bytes)", bytes.len());
        }
    }
}
