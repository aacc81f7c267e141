// libnfctag/src/engine/config.rs

//! Engine configuration. Defaults reproduce the fixed wait budgets of the
//! controller integration.

use std::time::Duration;

use crate::constants::MAX_DISCOVERY_BATCH;
use crate::types::NciVersion;
use crate::utils::timeout::{
    DEFAULT_PRESENCE_DELAY_MS, FORMAT_WAIT_MS, HALT_WAIT_MS, MAX_SELECT_RETRIES,
    NDEF_DETECT_WAIT_MS, NDEF_READ_WAIT_MS, NDEF_WRITE_WAIT_MS, PRESENCE_WAIT_MS,
    READ_ONLY_WAIT_MS, SELECT_RETRY_WAIT_MS, SELECT_WAIT_MS, ms,
};

/// Wait budgets and controller switches for one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Controller NCI version; 2.0 and later need a halt frame before
    /// leaving the frame interface
    pub nci_version: NciVersion,
    /// Route Mifare Classic traffic through the legacy reader path
    pub legacy_mifare_reader: bool,
    /// Wait for the activation answering a select
    pub select_wait_ms: u64,
    /// Pause between select retries
    pub select_retry_wait_ms: u64,
    /// Select attempts after a failed reactivation
    pub max_select_retries: u32,
    /// Wait for the halt frame echo
    pub halt_wait_ms: u64,
    /// Wait for NDEF detection
    pub ndef_detect_wait_ms: u64,
    /// Wait for an NDEF read
    pub ndef_read_wait_ms: u64,
    /// Wait for an NDEF write
    pub ndef_write_wait_ms: u64,
    /// Wait for formatting
    pub format_wait_ms: u64,
    /// Wait for each read-only attempt
    pub read_only_wait_ms: u64,
    /// Wait for one presence check answer
    pub presence_wait_ms: u64,
    /// Presence polling interval used when none is requested
    pub default_presence_delay_ms: u64,
    /// Discovery notifications after which a round is resolved
    pub max_batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nci_version: NciVersion::V2_0,
            legacy_mifare_reader: false,
            select_wait_ms: SELECT_WAIT_MS,
            select_retry_wait_ms: SELECT_RETRY_WAIT_MS,
            max_select_retries: MAX_SELECT_RETRIES,
            halt_wait_ms: HALT_WAIT_MS,
            ndef_detect_wait_ms: NDEF_DETECT_WAIT_MS,
            ndef_read_wait_ms: NDEF_READ_WAIT_MS,
            ndef_write_wait_ms: NDEF_WRITE_WAIT_MS,
            format_wait_ms: FORMAT_WAIT_MS,
            read_only_wait_ms: READ_ONLY_WAIT_MS,
            presence_wait_ms: PRESENCE_WAIT_MS,
            default_presence_delay_ms: DEFAULT_PRESENCE_DELAY_MS,
            max_batch_size: MAX_DISCOVERY_BATCH,
        }
    }
}

impl EngineConfig {
    /// `select_wait_ms` as a duration.
    pub fn select_wait(&self) -> Duration {
        ms(self.select_wait_ms)
    }

    /// `select_retry_wait_ms` as a duration.
    pub fn select_retry_wait(&self) -> Duration {
        ms(self.select_retry_wait_ms)
    }

    /// `halt_wait_ms` as a duration.
    pub fn halt_wait(&self) -> Duration {
        ms(self.halt_wait_ms)
    }

    /// Whether leaving the frame interface needs an explicit halt frame.
    pub fn needs_halt_frame(&self) -> bool {
        self.nci_version >= NciVersion::V2_0
    }
}
