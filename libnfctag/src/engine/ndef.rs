// libnfctag/src/engine/ndef.rs

use log::{debug, info, warn};

use crate::constants::DESFIRE_GET_VERSION;
use crate::engine::EngineInner;
use crate::protocol::{
    is_desfire_version_response, is_felica_lite, is_mifare_desfire, is_mifare_ultralight,
    ndef_write_payload,
};
use crate::transport::NdefDetectResult;
use crate::types::{ConnectionState, NdefMode, NfcStatus, Protocol, Technology};
use crate::utils::sync::lock;
use crate::utils::timeout::ms;
use crate::utils::{bytes_to_hex, parse_hex};
use crate::{Error, Result};

/// Answer of [`TagEngine::detect_ndef_info`](crate::engine::TagEngine::detect_ndef_info).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NdefDetection {
    /// The tag holds an NDEF message
    pub is_ndef: bool,
    /// Largest message the tag can store, in bytes
    pub max_size: u32,
    /// Access mode; `Unknown` when `is_ndef` is false
    pub mode: NdefMode,
}

impl NdefDetection {
    fn skipped() -> Self {
        Self {
            is_ndef: false,
            max_size: 0,
            mode: NdefMode::ReadOnly,
        }
    }
}

impl EngineInner {
    pub(crate) fn detect_ndef_info(&self) -> Result<NdefDetection> {
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);

        let protocol = lock(&self.conn).protocol;
        let quirks = *lock(&self.quirks);
        if protocol == Some(Protocol::T3bt) || (quirks.multi_proto_mifare && quirks.skip_ndef_read)
        {
            debug!("ndef detect skipped for {:?}", protocol);
            return Ok(NdefDetection::skipped());
        }

        self.require_active()?;
        *lock(&self.ndef_cache) = NdefDetectResult::default();
        let waiter = &self.waiters.detect;
        waiter.arm();
        if let Err(e) = self.channel.detect_ndef() {
            waiter.disarm();
            return Err(e);
        }
        waiter.wait(ms(self.config.ndef_detect_wait_ms))?;

        let cache = *lock(&self.ndef_cache);
        Ok(NdefDetection {
            is_ndef: cache.status.is_ok(),
            max_size: cache.max_size,
            mode: cache.mode,
        })
    }

    pub(crate) fn read_ndef(&self) -> Result<String> {
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        let conn = self.require_active()?;

        let cache = *lock(&self.ndef_cache);
        if cache.current_size == 0 {
            debug!("ndef read: nothing detected");
            return Ok(String::new());
        }

        let waiter = &self.waiters.read;
        waiter.arm();
        let legacy = self.config.legacy_mifare_reader && conn.protocol == Some(Protocol::Mifare);
        let sent = if legacy {
            self.channel.read_mifare_ndef()
        } else {
            self.channel.read_ndef()
        };
        if let Err(e) = sent {
            waiter.disarm();
            return Err(e);
        }

        match waiter.wait(ms(self.config.ndef_read_wait_ms)) {
            Ok((status, data)) if status.is_ok() => Ok(bytes_to_hex(&data)),
            Ok((status, _)) => Err(Error::Hardware(status)),
            Err(e @ Error::Timeout { .. }) => {
                warn!("ndef read timed out, blocking reselect until next activation");
                {
                    let mut conn = lock(&self.conn);
                    conn.ndef_read_timed_out = true;
                    conn.state = ConnectionState::Inactive;
                }
                self.waiters.abort_all();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn write_ndef(&self, message: &str) -> Result<()> {
        let message = parse_hex(message)?;
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        self.require_active()?;

        let cache = *lock(&self.ndef_cache);
        if !cache.status.is_ok() && cache.is_capable {
            info!("ndef write: formatting first");
            self.format_locked(&[])?;
        }

        let payload = ndef_write_payload(&message);
        let waiter = &self.waiters.write;
        waiter.arm();
        if let Err(e) = self.channel.write_ndef(&payload) {
            waiter.disarm();
            return Err(e);
        }
        match waiter.wait(ms(self.config.ndef_write_wait_ms))? {
            NfcStatus::Ok => Ok(()),
            status => Err(Error::Hardware(status)),
        }
    }

    pub(crate) fn format_ndef(&self, key: &str) -> Result<()> {
        let key = parse_hex(key)?;
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        self.require_active()?;
        self.format_locked(&key)
    }

    fn format_locked(&self, key: &[u8]) -> Result<()> {
        let waiter = &self.waiters.format;
        waiter.arm();
        if let Err(e) = self.channel.format_tag(key) {
            waiter.disarm();
            return Err(e);
        }
        let status = waiter.wait(ms(self.config.format_wait_ms))?;
        if status.is_ok() {
            Ok(())
        } else {
            warn!("format answered {}", status);
            Err(Error::FormatFailed)
        }
    }

    pub(crate) fn is_ndef_formattable(&self) -> Result<bool> {
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        let conn = self.require_active()?;
        let (Some(protocol), Some(params)) = (conn.protocol, conn.params) else {
            return Ok(false);
        };
        let record = conn.tag.and_then(|id| self.registry.get(id));

        let formattable = match protocol {
            Protocol::T1t | Protocol::T5t | Protocol::Mifare => true,
            Protocol::T2t => {
                is_mifare_ultralight(&params)
                    || record.is_some_and(|r| r.index_of(Technology::MifareUltralight).is_some())
            }
            Protocol::T3t => is_felica_lite(&params),
            Protocol::IsoDep => is_mifare_desfire(&params) && self.confirm_desfire(),
            _ => false,
        };
        debug!("{} formattable: {}", protocol, formattable);
        Ok(formattable)
    }

    fn confirm_desfire(&self) -> bool {
        match self.exchange_locked(&DESFIRE_GET_VERSION) {
            Ok(response) => is_desfire_version_response(&response),
            Err(e) => {
                debug!("DESFire GetVersion: {}", e);
                false
            }
        }
    }

    pub(crate) fn set_ndef_read_only(&self) -> Result<()> {
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        self.require_active()?;

        let mut status = self.read_only_locked(true)?;
        if status == NfcStatus::Rejected {
            debug!("hard lock rejected, retrying soft lock");
            status = self.read_only_locked(false)?;
        }
        if status.is_ok() {
            Ok(())
        } else {
            Err(Error::ReadOnlyFailed(status))
        }
    }

    fn read_only_locked(&self, hard_lock: bool) -> Result<NfcStatus> {
        let waiter = &self.waiters.read_only;
        waiter.arm();
        if let Err(e) = self.channel.set_tag_read_only(hard_lock) {
            waiter.disarm();
            return Err(e);
        }
        waiter.wait(ms(self.config.read_only_wait_ms))
    }
}
