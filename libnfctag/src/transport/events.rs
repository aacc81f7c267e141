// libnfctag/src/transport/events.rs

use crate::tag::RfTechParams;
use crate::types::{
    DataStatus, DeactivationKind, DiscoveryId, NdefMode, NfcStatus, Protocol, RfInterface,
};

/// One RF discovery notification. `more` is set while the controller has
/// further notifications for the same round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryNotification {
    /// Non-OK on a failed round
    pub status: NfcStatus,
    /// Handle of this candidate
    pub discovery_id: DiscoveryId,
    /// Protocol reported for the candidate
    pub protocol: Protocol,
    /// Poll parameters of the candidate
    pub params: RfTechParams,
    /// Further notifications follow in this round
    pub more: bool,
}

/// Interface activation of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationNotification {
    /// Handle of the activated target
    pub discovery_id: DiscoveryId,
    /// Protocol activated
    pub protocol: Protocol,
    /// Interface the controller activated
    pub interface: RfInterface,
    /// Poll parameters of the activation
    pub params: RfTechParams,
    /// ISO-DEP activation parameters: the ATS starting at T0 for NFC-A, the
    /// ATTRIB response for NFC-B. Empty for other interfaces.
    pub activation_bytes: Vec<u8>,
}

/// Result of an NDEF detection procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdefDetectResult {
    /// `Ok` when an NDEF area was found
    pub status: NfcStatus,
    /// Access mode of the NDEF area
    pub mode: NdefMode,
    /// Length of the stored message
    pub current_size: u32,
    /// Capacity of the NDEF area
    pub max_size: u32,
    /// Tag supports NDEF even when detection failed (e.g. not yet formatted)
    pub is_capable: bool,
}

impl Default for NdefDetectResult {
    fn default() -> Self {
        Self {
            status: NfcStatus::Failed,
            mode: NdefMode::Unknown,
            current_size: 0,
            max_size: 0,
            is_capable: false,
        }
    }
}

/// Asynchronous events delivered by the controller library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareEvent {
    /// One discovered candidate
    Discovery(DiscoveryNotification),
    /// A target was activated, after a select or on its own
    Activated(ActivationNotification),
    /// The target was deactivated into the given state
    Deactivated(DeactivationKind),
    /// Controller answer to a select command; only failures matter
    SelectResult(NfcStatus),
    /// A chunk of data received from the target
    Data {
        /// Whether more chunks follow
        status: DataStatus,
        /// Chunk payload
        bytes: Vec<u8>,
    },
    /// Answer to a presence check
    PresenceCheck {
        /// The target answered
        present: bool,
    },
    /// Answer to NDEF detection
    NdefDetected(NdefDetectResult),
    /// Answer to an NDEF read
    NdefRead {
        /// Read status
        status: NfcStatus,
        /// Message bytes; empty on failure
        data: Vec<u8>,
    },
    /// Answer to an NDEF write
    NdefWritten(NfcStatus),
    /// Answer to a format
    Formatted(NfcStatus),
    /// Answer to a read-only request
    ReadOnly(NfcStatus),
    /// Discovery started or stopped
    RfDiscovery {
        /// Started rather than stopped
        started: bool,
        /// Outcome of the request
        status: NfcStatus,
    },
}

/// Receiver of [`HardwareEvent`]s. Implemented by the engine.
pub trait EventSink: Send + Sync {
    /// Called on the controller's callback thread.
    fn on_event(&self, event: HardwareEvent);
}
