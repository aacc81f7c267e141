// libnfctag/src/engine/mod.rs

//! The tag engine: one object owning every piece of connection state for a
//! radio-on lifetime.
//!
//! Lock order is presence pause, then `rf_lock`, then the short-lived state
//! locks. The event thread never takes `rf_lock`.

/// Engine construction
pub mod builder;
pub mod config;
pub mod connection;
pub mod events;
/// NDEF detection, read, write, format and locking
pub mod ndef;
pub mod presence;
/// Per-tag quirk flags and the discovery round state
pub mod state;
/// Per-technology transceive timeouts
pub mod timeout;
/// Raw frame exchange with the connected tag
pub mod transceive;
pub(crate) mod waiter;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, info};

pub use builder::TagEngineBuilder;
pub use config::EngineConfig;
pub use ndef::NdefDetection;
pub use presence::PresencePause;
pub use state::QuirkFlags;
pub use timeout::{DEFAULT_TIMEOUT_MS, TimeoutTable, default_timeout_ms};

use crate::tag::{TagListener, TagRecord, TagRegistry};
use crate::transport::{HardwareChannel, NdefDetectResult};
use crate::types::{ConnectionState, DiscoveryId};
use crate::utils::sync::{lock, read, write};
use crate::utils::timeout::ms;
use crate::{Error, Result};
use presence::PresenceMonitor;
use state::{Connection, DiscoveryState};
use waiter::Waiters;

pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) channel: Arc<dyn HardwareChannel>,
    pub(crate) registry: TagRegistry,
    pub(crate) conn: Mutex<Connection>,
    pub(crate) quirks: Mutex<QuirkFlags>,
    pub(crate) ndef_cache: Mutex<NdefDetectResult>,
    pub(crate) timeouts: RwLock<TimeoutTable>,
    pub(crate) waiters: Waiters,
    /// Discovery mutex serializing hardware access of foreground calls
    pub(crate) rf_lock: Mutex<()>,
    pub(crate) discovery: Mutex<DiscoveryState>,
    pub(crate) presence: PresenceMonitor,
    shut_down: AtomicBool,
}

impl EngineInner {
    pub(crate) fn new(config: EngineConfig, channel: Arc<dyn HardwareChannel>) -> Self {
        let max_batch = config.max_batch_size;
        Self {
            config,
            channel,
            registry: TagRegistry::new(),
            conn: Mutex::new(Connection::default()),
            quirks: Mutex::new(QuirkFlags::default()),
            ndef_cache: Mutex::new(NdefDetectResult::default()),
            timeouts: RwLock::new(TimeoutTable::new()),
            waiters: Waiters::new(),
            rf_lock: Mutex::new(()),
            discovery: Mutex::new(DiscoveryState::new(max_batch)),
            presence: PresenceMonitor::default(),
            shut_down: AtomicBool::new(false),
        }
    }

    pub(crate) fn connection(&self) -> Connection {
        lock(&self.conn).clone()
    }

    /// Fail unless a published tag is active.
    pub(crate) fn require_active(&self) -> Result<Connection> {
        let conn = self.connection();
        match conn.state {
            ConnectionState::Active if conn.tag.is_some() => Ok(conn),
            ConnectionState::Inactive => Err(Error::Busy("ndef read timed out".into())),
            _ => Err(Error::NotActive),
        }
    }

    /// Forget the connection and report the connected tag lost.
    pub(crate) fn clear_connection(&self) {
        let tag = {
            let mut conn = lock(&self.conn);
            let tag = conn.tag.take();
            *conn = Connection::default();
            tag
        };
        *lock(&self.quirks) = QuirkFlags::default();
        if let Some(id) = tag {
            self.registry.remove_lost(id);
        }
    }

    fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("engine shutdown");
        self.presence.stop();
        self.waiters.abort_all();
        let _rf = lock(&self.rf_lock);
        self.clear_connection();
        lock(&self.discovery).reset();
        self.registry.clear_lost();
        self.presence.set_field_on(false);
    }
}

/// Synchronous tag API over an injected [`HardwareChannel`].
///
/// Calls block for at most the configured wait of the operation. Build one
/// with [`TagEngineBuilder`]; dropping it shuts the engine down.
pub struct TagEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for TagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagEngine")
            .field("state", &self.connection_state())
            .field("tags", &self.inner.registry.len())
            .finish()
    }
}

impl TagEngine {
    pub(crate) fn from_inner(inner: Arc<EngineInner>) -> Self {
        Self { inner }
    }

    /// Start building an engine.
    pub fn builder() -> TagEngineBuilder {
        TagEngineBuilder::new()
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Switch the connected tag to the technology at `tech_index`.
    pub fn connect(&self, tech_index: usize) -> Result<()> {
        self.inner.connect(tech_index)
    }

    /// Best-effort release of the tag. Always reports success.
    pub fn disconnect(&self) -> Result<bool> {
        Ok(self.inner.disconnect())
    }

    /// Re-select the connected tag on its current interface.
    pub fn reconnect(&self) -> Result<()> {
        self.inner.reconnect()
    }

    /// Exchange one frame. Request and response are uppercase hex.
    pub fn transceive(&self, request: &str) -> Result<String> {
        self.inner.transceive(request)
    }

    /// Check the connected tag for NDEF and cache the result.
    pub fn detect_ndef_info(&self) -> Result<NdefDetection> {
        self.inner.detect_ndef_info()
    }

    /// Read the stored NDEF message as hex. A timeout leaves the tag inactive
    /// until the next activation.
    pub fn read_ndef(&self) -> Result<String> {
        self.inner.read_ndef()
    }

    /// Write a hex NDEF message, formatting the tag first when it is formattable
    /// but carries no NDEF. An empty message writes an empty record.
    pub fn write_ndef(&self, message: &str) -> Result<()> {
        self.inner.write_ndef(message)
    }

    /// Format with a hex key.
    pub fn format_ndef(&self, key: &str) -> Result<()> {
        self.inner.format_ndef(key)
    }

    /// Whether the tag can be formatted for NDEF. DESFire parts are confirmed
    /// with a GetVersion exchange.
    pub fn is_ndef_formattable(&self) -> Result<bool> {
        self.inner.is_ndef_formattable()
    }

    /// Lock the NDEF area. A rejected hard lock is retried as a soft lock.
    pub fn set_ndef_read_only(&self) -> Result<()> {
        self.inner.set_ndef_read_only()
    }

    /// Whether the last presence information says the tag is in the field.
    pub fn is_tag_field_on(&self) -> bool {
        self.inner.presence.field_on()
    }

    /// Poll the connected tag every `delay_ms` (0 picks the configured
    /// default) and report it lost when it stops answering.
    pub fn start_field_on_checking(&self, delay_ms: u64) -> Result<()> {
        self.inner.require_active()?;
        let delay = if delay_ms == 0 {
            self.inner.config.default_presence_delay_ms
        } else {
            delay_ms
        };
        self.inner.presence.start(&self.inner, ms(delay))
    }

    /// Stop the presence watchdog and wait for it to exit.
    pub fn stop_field_checking(&self) {
        self.inner.presence.stop();
    }

    /// Whether the presence watchdog is running.
    pub fn is_field_checking(&self) -> bool {
        self.inner.presence.is_running()
    }

    /// Pause presence checking until the guard is dropped.
    pub fn pause_field_checking(&self) -> PresencePause<'_> {
        self.inner.presence.pause()
    }

    /// Override the transceive timeout of a technology code. Unknown codes are
    /// ignored.
    pub fn set_timeout(&self, tech: u32, timeout_ms: u32) {
        write(&self.inner.timeouts).set(tech, timeout_ms);
    }

    /// Transceive timeout of a technology code; [`DEFAULT_TIMEOUT_MS`] for
    /// unknown codes.
    pub fn get_timeout(&self, tech: u32) -> u32 {
        read(&self.inner.timeouts).get(tech)
    }

    /// Restore the default timeout of every technology.
    pub fn reset_timeout(&self) {
        debug!("timeouts reset");
        write(&self.inner.timeouts).reset();
    }

    /// Force-wake every pending wait; the blocked calls fail with
    /// [`Error::Aborted`].
    pub fn abort_wait(&self) {
        self.inner.waiters.abort_all();
    }

    /// State of the RF-connected tag.
    pub fn connection_state(&self) -> ConnectionState {
        lock(&self.inner.conn).state
    }

    /// Quirks detected for the connected tag.
    pub fn quirks(&self) -> QuirkFlags {
        *lock(&self.inner.quirks)
    }

    /// Result of the last NDEF detection.
    pub fn ndef_cache(&self) -> NdefDetectResult {
        *lock(&self.inner.ndef_cache)
    }

    /// Record of a known tag.
    pub fn tag(&self, id: DiscoveryId) -> Option<TagRecord> {
        self.inner.registry.get(id)
    }

    /// Record of the tag currently connected over RF.
    pub fn connected_tag(&self) -> Option<TagRecord> {
        self.inner.registry.connected()
    }

    /// Every known tag, in discovery order.
    pub fn tags(&self) -> Vec<TagRecord> {
        self.inner.registry.tags()
    }

    /// Replace the tag listener; `None` silences callbacks.
    pub fn set_listener(&self, listener: Option<Arc<dyn TagListener>>) {
        self.inner.registry.set_listener(listener);
    }

    /// Stop checking, abort waits and forget every tag. Also run on drop.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl Drop for TagEngine {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}
