// libnfctag/src/test_support.rs

//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize MockChannel setup and activation fixtures so
//! tests across the crate and tests/ directory share the same tags.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::engine::{EngineConfig, TagEngine, TagEngineBuilder};
use crate::tag::{RfTechParams, TagListener, TagRecord};
use crate::transport::{
    ActivationNotification, DiscoveryNotification, EventSink, HardwareChannel, HardwareEvent,
    MockChannel,
};
use crate::types::{DiscoveryId, NfcStatus, Protocol, RfInterface};
use crate::utils::sync::lock;
use crate::Result;

/// Route `log` output through the test harness. Safe to call repeatedly.
#[cfg(test)]
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[doc(hidden)]
pub fn poll_a(atqa: [u8; 2], uid: &[u8], sak: u8) -> RfTechParams {
    RfTechParams::PollA {
        sens_res: atqa,
        nfcid1: uid.to_vec(),
        sel_res: sak,
    }
}

/// SENSB_RES body: NFCID0, application data (4 bytes), protocol info.
#[doc(hidden)]
pub fn poll_b(nfcid0: [u8; 4]) -> RfTechParams {
    let mut sensb_res = nfcid0.to_vec();
    sensb_res.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x80, 0x81, 0x71]);
    RfTechParams::PollB { sensb_res }
}

/// SENSF_RES body: NFCID2, PMm and `system_code`.
#[doc(hidden)]
pub fn poll_f(system_code: u16) -> RfTechParams {
    let mut sensf_res = vec![0x01, 0x2e, 0x3d, 0x4c, 0x5b, 0x6a, 0x79, 0x88];
    sensf_res.extend_from_slice(&[0x00, 0xf1, 0x00, 0x00, 0x00, 0x01, 0x43, 0x00]);
    sensf_res.extend_from_slice(&system_code.to_be_bytes());
    RfTechParams::PollF {
        bit_rate: 1,
        sensf_res,
    }
}

#[doc(hidden)]
pub fn discovery(
    id: u32,
    protocol: Protocol,
    params: RfTechParams,
    more: bool,
) -> DiscoveryNotification {
    DiscoveryNotification {
        status: NfcStatus::Ok,
        discovery_id: DiscoveryId::new(id),
        protocol,
        params,
        more,
    }
}

#[doc(hidden)]
pub fn activation(
    id: u32,
    protocol: Protocol,
    params: RfTechParams,
    activation_bytes: Vec<u8>,
) -> ActivationNotification {
    ActivationNotification {
        discovery_id: DiscoveryId::new(id),
        protocol,
        interface: protocol.default_interface(),
        params,
        activation_bytes,
    }
}

/// ISO-DEP over NFC-A. The ATS carries TA and TC only, so the ISO-DEP
/// timeout keeps its default.
#[doc(hidden)]
pub fn iso_dep_a_activation(id: u32, uid: &[u8]) -> ActivationNotification {
    activation(
        id,
        Protocol::IsoDep,
        poll_a([0x04, 0x00], uid, 0x20),
        vec![0x50, 0x80, 0x02],
    )
}

#[doc(hidden)]
pub fn iso_dep_b_activation(id: u32, nfcid0: [u8; 4]) -> ActivationNotification {
    activation(id, Protocol::IsoDep, poll_b(nfcid0), vec![0x00])
}

#[doc(hidden)]
pub fn mifare_activation(id: u32, uid: &[u8]) -> ActivationNotification {
    activation(id, Protocol::Mifare, poll_a([0x04, 0x00], uid, 0x08), Vec::new())
}

/// Type 2 tag; a UID starting with 0x04 matches the Ultralight signature.
#[doc(hidden)]
pub fn t2t_activation(id: u32, uid: &[u8]) -> ActivationNotification {
    activation(id, Protocol::T2t, poll_a([0x44, 0x00], uid, 0x00), Vec::new())
}

#[doc(hidden)]
pub fn desfire_activation(id: u32, uid: &[u8]) -> ActivationNotification {
    activation(
        id,
        Protocol::IsoDep,
        poll_a([0x44, 0x03], uid, 0x20),
        vec![0x50, 0x80, 0x02],
    )
}

#[doc(hidden)]
pub fn cashbee_activation(id: u32, uid: &[u8]) -> ActivationNotification {
    activation(
        id,
        Protocol::IsoDep,
        poll_a([0x08, 0x00], uid, 0x20),
        vec![0x50, 0x80, 0x02],
    )
}

#[doc(hidden)]
pub fn felica_activation(id: u32, system_code: u16) -> ActivationNotification {
    activation(id, Protocol::T3t, poll_f(system_code), Vec::new())
}

/// Short waits so failing paths finish quickly.
#[doc(hidden)]
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        select_wait_ms: 200,
        select_retry_wait_ms: 50,
        halt_wait_ms: 20,
        ndef_detect_wait_ms: 300,
        ndef_read_wait_ms: 300,
        ndef_write_wait_ms: 300,
        format_wait_ms: 300,
        read_only_wait_ms: 300,
        presence_wait_ms: 200,
        ..EngineConfig::default()
    }
}

#[doc(hidden)]
pub fn engine_with_config(config: EngineConfig) -> Result<(TagEngine, Arc<MockChannel>)> {
    #[cfg(test)]
    init_logging();
    let mock = Arc::new(MockChannel::new());
    let channel: Arc<dyn HardwareChannel> = mock.clone();
    let engine = TagEngineBuilder::new()
        .with_channel(channel)
        .with_config(config)
        .build()?;
    Ok((engine, mock))
}

/// Engine over a fresh MockChannel using [`fast_config`].
#[doc(hidden)]
pub fn engine_with_mock() -> Result<(TagEngine, Arc<MockChannel>)> {
    engine_with_config(fast_config())
}

/// Poll `cond` until it holds or `timeout` elapses.
#[doc(hidden)]
pub fn wait_until<F>(timeout: Duration, cond: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

/// Place `activation` on the mock, report it as the only candidate of a
/// discovery round and wait until the engine publishes it.
#[doc(hidden)]
pub fn discover(
    engine: &TagEngine,
    mock: &MockChannel,
    activation: ActivationNotification,
) -> Option<TagRecord> {
    let id = activation.discovery_id;
    let notification = DiscoveryNotification {
        status: NfcStatus::Ok,
        discovery_id: id,
        protocol: activation.protocol,
        params: activation.params.clone(),
        more: false,
    };
    mock.place_target(activation);
    mock.inject(vec![HardwareEvent::Discovery(notification)]);
    if wait_until(Duration::from_secs(1), || engine.connected_tag().is_some()) {
        engine.tag(id)
    } else {
        None
    }
}

/// Listener recording every callback.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct RecordingListener {
    discovered: Mutex<Vec<DiscoveryId>>,
    lost: Mutex<Vec<DiscoveryId>>,
}

impl RecordingListener {
    /// Ids reported through `on_tag_discovered`.
    pub fn discovered(&self) -> Vec<DiscoveryId> {
        lock(&self.discovered).clone()
    }

    /// Ids reported through `on_tag_lost`.
    pub fn lost(&self) -> Vec<DiscoveryId> {
        lock(&self.lost).clone()
    }
}

impl TagListener for RecordingListener {
    fn on_tag_discovered(&self, id: DiscoveryId) {
        lock(&self.discovered).push(id);
    }

    fn on_tag_lost(&self, id: DiscoveryId) {
        lock(&self.lost).push(id);
    }
}

/// Event sink forwarding every event to a queue, for channel-level tests.
#[doc(hidden)]
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<HardwareEvent>,
    rx: Receiver<HardwareEvent>,
}

impl ChannelSink {
    /// Register a new sink on `channel`.
    pub fn attach(channel: &dyn HardwareChannel) -> Arc<Self> {
        let (tx, rx) = unbounded();
        let sink = Arc::new(Self { tx, rx });
        let as_sink: Arc<dyn EventSink> = sink.clone();
        channel.register_sink(Arc::downgrade(&as_sink));
        sink
    }
}

impl EventSink for ChannelSink {
    fn on_event(&self, event: HardwareEvent) {
        let _ = self.tx.send(event);
    }
}

/// Next event delivered to `sink`, waiting up to one second.
#[doc(hidden)]
pub fn recv_timeout(sink: &ChannelSink) -> Option<HardwareEvent> {
    sink.rx.recv_timeout(Duration::from_secs(1)).ok()
}

/// Interface a select for `activation` would request.
#[doc(hidden)]
pub fn default_interface(activation: &ActivationNotification) -> RfInterface {
    activation.protocol.default_interface()
}
