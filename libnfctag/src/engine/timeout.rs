// libnfctag/src/engine/timeout.rs

use std::convert::TryFrom;

use log::{debug, warn};

use crate::types::Technology;

/// Returned for technology codes outside the table.
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;

/// Built-in response timeout of `tech`, in milliseconds. These follow the
/// frame waiting times of each technology.
pub const fn default_timeout_ms(tech: Technology) -> u32 {
    match tech {
        Technology::NfcA => 618,
        Technology::NfcB => 1000,
        Technology::IsoDep => 618,
        Technology::NfcF => 255,
        Technology::NfcV => 1000,
        Technology::Ndef => 1000,
        Technology::NdefFormatable => 1000,
        Technology::MifareClassic => 618,
        Technology::MifareUltralight => 618,
        Technology::NfcBarcode => 1000,
    }
}

/// Per-technology transceive timeout, indexed by technology code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutTable {
    entries: [u32; Technology::ALL.len()],
}

impl Default for TimeoutTable {
    fn default() -> Self {
        let mut table = Self {
            entries: [0; Technology::ALL.len()],
        };
        table.reset();
        table
    }
}

impl TimeoutTable {
    /// Table holding the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `timeout_ms` for technology code `tech`. Unknown codes are
    /// ignored.
    pub fn set(&mut self, tech: u32, timeout_ms: u32) {
        match Technology::try_from(tech) {
            Ok(t) => {
                debug!("timeout {} = {} ms", t, timeout_ms);
                self.entries[Self::slot(t)] = timeout_ms;
            }
            Err(_) => warn!("set_timeout: technology {} out of range", tech),
        }
    }

    /// Timeout of technology code `tech`; [`DEFAULT_TIMEOUT_MS`] for unknown codes.
    pub fn get(&self, tech: u32) -> u32 {
        Technology::try_from(tech)
            .map(|t| self.get_tech(t))
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    /// Typed form of [`get`](Self::get).
    pub fn get_tech(&self, tech: Technology) -> u32 {
        self.entries[Self::slot(tech)]
    }

    /// Typed form of [`set`](Self::set).
    pub fn set_tech(&mut self, tech: Technology, timeout_ms: u32) {
        self.set(tech.code(), timeout_ms);
    }

    /// Restore [`default_timeout_ms`] for every technology.
    pub fn reset(&mut self) {
        for tech in Technology::ALL {
            self.entries[Self::slot(tech)] = default_timeout_ms(tech);
        }
    }

    fn slot(tech: Technology) -> usize {
        (tech.code() - Technology::MIN_CODE) as usize
    }
}
