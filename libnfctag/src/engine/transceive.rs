// libnfctag/src/engine/transceive.rs

use log::debug;

use crate::engine::EngineInner;
use crate::engine::timeout::DEFAULT_TIMEOUT_MS;
use crate::protocol::{MifareReply, check_mifare_response, is_t2t_nack};
use crate::types::{NfcStatus, Protocol, Technology};
use crate::utils::sync::{lock, read};
use crate::utils::timeout::ms;
use crate::utils::{bytes_to_hex, parse_hex};
use crate::{Error, Result};

impl EngineInner {
    pub(crate) fn transceive(&self, request: &str) -> Result<String> {
        let frame = parse_hex(request)?;
        if frame.is_empty() {
            return Err(Error::InvalidParameter("empty frame".into()));
        }
        let _pause = self.presence.pause();
        let _rf = lock(&self.rf_lock);
        self.transceive_locked(&frame)
    }

    fn transceive_locked(&self, frame: &[u8]) -> Result<String> {
        let conn = self.require_active()?;
        let protocol = conn.protocol;
        let legacy_mifare = self.uses_legacy_mifare(protocol);
        let response = self.exchange_locked(frame)?;

        if protocol == Some(Protocol::T2t) && is_t2t_nack(&response) {
            debug!("T2T NACK {:02X}, reconnecting", response[0]);
            self.reconnect_locked()?;
            return Ok(String::new());
        }
        if legacy_mifare {
            return match check_mifare_response(&response) {
                MifareReply::Data(data) => Ok(bytes_to_hex(&data)),
                MifareReply::Nack(code) => {
                    debug!("Mifare NACK {:02X}, reconnecting", code);
                    self.reconnect_locked()?;
                    Ok(bytes_to_hex(&[code]))
                }
            };
        }
        Ok(bytes_to_hex(&response))
    }

    fn uses_legacy_mifare(&self, protocol: Option<Protocol>) -> bool {
        self.config.legacy_mifare_reader && protocol == Some(Protocol::Mifare)
    }

    /// Timeout of the connected technology.
    fn transceive_timeout_ms(&self) -> u32 {
        let conn = lock(&self.conn).clone();
        let tech: Option<Technology> = conn
            .tag
            .and_then(|id| self.registry.get(id))
            .zip(conn.tech_index)
            .and_then(|(record, index)| record.technology(index));
        match tech {
            Some(t) => read(&self.timeouts).get_tech(t),
            None => DEFAULT_TIMEOUT_MS,
        }
    }

    /// Send one frame and collect the chunks of its answer.
    pub(crate) fn exchange_locked(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let conn = self.require_active()?;
        let timeout = self.transceive_timeout_ms();
        let waiter = &self.waiters.transceive;
        waiter.arm();
        let sent = if self.uses_legacy_mifare(conn.protocol) {
            self.channel.send_mifare_frame(frame)
        } else {
            self.channel.send_raw_frame(frame)
        };
        if let Err(e) = sent {
            waiter.disarm();
            return Err(e);
        }
        let rx = waiter.wait_until(ms(u64::from(timeout)), |f| f.complete)?;
        if rx.failed {
            return Err(Error::Hardware(NfcStatus::Failed));
        }
        Ok(rx.bytes)
    }
}
