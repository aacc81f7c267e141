// libnfctag/src/types.rs

use crate::Error;
use derive_more::Display;
use std::convert::TryFrom;

/// Handle assigned by the controller to one discovered target. Stable until
/// the target is deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display(fmt = "#{}", _0)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveryId(u32);

impl DiscoveryId {
    /// Wraps a raw controller handle.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw handle value.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for DiscoveryId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Tag identifier bytes (NFCID1, NFCID0, NFCID2 or the T5T UID).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid(Vec<u8>);

impl Uid {
    /// Takes ownership of identifier bytes as received.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True for T1T/T3T targets whose identifier is not known until activation.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Uppercase hex rendering, as used in logs and by the session layer.
    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(&self.0)
    }
}

impl From<&[u8]> for Uid {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// RF protocol reported by the controller for a discovered target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Protocol {
    /// Protocol code the engine does not recognise.
    #[display(fmt = "UNDETERMINED")]
    Undetermined,
    /// Type 1 tag (Topaz).
    #[display(fmt = "T1T")]
    T1t,
    /// Type 2 tag, including Mifare Ultralight.
    #[display(fmt = "T2T")]
    T2t,
    /// Type 3 tag (FeliCa).
    #[display(fmt = "T3T")]
    T3t,
    /// ISO 14443-4.
    #[display(fmt = "ISO_DEP")]
    IsoDep,
    /// Peer-to-peer; never reported upward as a tag.
    #[display(fmt = "NFC_DEP")]
    NfcDep,
    /// Type 5 tag (ISO 15693).
    #[display(fmt = "T5T")]
    T5t,
    /// Mifare Classic through the vendor interface.
    #[display(fmt = "MIFARE")]
    Mifare,
    /// Kovio barcode.
    #[display(fmt = "KOVIO")]
    Kovio,
    /// Type 3B (Cashbee) through the proprietary interface.
    #[display(fmt = "T3BT")]
    T3bt,
}

impl Protocol {
    /// Decodes a controller protocol code; unknown codes map to `Undetermined`.
    pub fn from_u8(code: u8) -> Self {
        match code {
            0x01 => Self::T1t,
            0x02 => Self::T2t,
            0x03 => Self::T3t,
            0x04 => Self::IsoDep,
            0x05 => Self::NfcDep,
            0x06 => Self::T5t,
            0x80 => Self::Mifare,
            0x8a => Self::Kovio,
            0x8b => Self::T3bt,
            _ => Self::Undetermined,
        }
    }

    /// Controller protocol code.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Undetermined => 0x00,
            Self::T1t => 0x01,
            Self::T2t => 0x02,
            Self::T3t => 0x03,
            Self::IsoDep => 0x04,
            Self::NfcDep => 0x05,
            Self::T5t => 0x06,
            Self::Mifare => 0x80,
            Self::Kovio => 0x8a,
            Self::T3bt => 0x8b,
        }
    }

    /// RF interface the host uses by default for this protocol.
    pub fn default_interface(&self) -> RfInterface {
        match self {
            Self::IsoDep => RfInterface::IsoDep,
            Self::Mifare => RfInterface::Mifare,
            _ => RfInterface::Frame,
        }
    }
}

/// Host-side framing mode for an activated target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RfInterface {
    /// Raw frame exchange; the host does the framing.
    #[display(fmt = "FRAME")]
    Frame,
    /// Controller handles ISO-DEP framing.
    #[display(fmt = "ISO_DEP")]
    IsoDep,
    /// Controller handles NFC-DEP framing.
    #[display(fmt = "NFC_DEP")]
    NfcDep,
    /// Vendor Mifare interface with controller-side authentication.
    #[display(fmt = "MIFARE")]
    Mifare,
}

impl RfInterface {
    /// Controller interface code.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Frame => 0x01,
            Self::IsoDep => 0x02,
            Self::NfcDep => 0x03,
            Self::Mifare => 0x80,
        }
    }
}

/// RF technology and mode a target was polled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RfTechMode {
    /// NFC-A poll.
    #[display(fmt = "POLL_A")]
    PollA,
    /// NFC-B poll.
    #[display(fmt = "POLL_B")]
    PollB,
    /// NFC-F poll.
    #[display(fmt = "POLL_F")]
    PollF,
    /// NFC-V poll.
    #[display(fmt = "POLL_V")]
    PollV,
    /// Proprietary Kovio poll.
    #[display(fmt = "POLL_KOVIO")]
    PollKovio,
}

/// Technology codes exposed to the session layer. Values are part of the
/// upward API and index the timeout table.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Technology {
    /// ISO 14443-3A.
    #[display(fmt = "NfcA")]
    NfcA = 1,
    /// ISO 14443-3B.
    #[display(fmt = "NfcB")]
    NfcB = 2,
    /// ISO 14443-4.
    #[display(fmt = "IsoDep")]
    IsoDep = 3,
    /// JIS 6319-4 (FeliCa).
    #[display(fmt = "NfcF")]
    NfcF = 4,
    /// ISO 15693.
    #[display(fmt = "NfcV")]
    NfcV = 5,
    /// Tag carries an NDEF message.
    #[display(fmt = "Ndef")]
    Ndef = 6,
    /// Tag can be formatted for NDEF.
    #[display(fmt = "NdefFormatable")]
    NdefFormatable = 7,
    /// Mifare Classic.
    #[display(fmt = "MifareClassic")]
    MifareClassic = 8,
    /// Mifare Ultralight family.
    #[display(fmt = "MifareUltralight")]
    MifareUltralight = 9,
    /// Kovio barcode.
    #[display(fmt = "NfcBarcode")]
    NfcBarcode = 10,
}

impl Technology {
    /// Lowest valid technology code.
    pub const MIN_CODE: u32 = 1;
    /// Highest valid technology code.
    pub const MAX_CODE: u32 = 10;

    /// Every technology in code order.
    pub const ALL: [Self; 10] = [
        Self::NfcA,
        Self::NfcB,
        Self::IsoDep,
        Self::NfcF,
        Self::NfcV,
        Self::Ndef,
        Self::NdefFormatable,
        Self::MifareClassic,
        Self::MifareUltralight,
        Self::NfcBarcode,
    ];

    /// Numeric code exposed upward.
    pub fn code(&self) -> u32 {
        *self as u32
    }
}

impl TryFrom<u32> for Technology {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown technology {}", code)))
    }
}

/// NCI version reported by the controller (major nibble, minor nibble).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NciVersion(u8);

impl std::fmt::Display for NciVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.0 >> 4, self.0 & 0x0f)
    }
}

impl NciVersion {
    /// NCI 1.0.
    pub const V1_0: Self = Self(0x10);
    /// NCI 2.0.
    pub const V2_0: Self = Self(0x20);

    /// Wraps the raw version byte.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }
}

impl Default for NciVersion {
    fn default() -> Self {
        Self::V2_0
    }
}

/// Completion status carried by controller events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NfcStatus {
    /// Success.
    #[display(fmt = "OK")]
    Ok,
    /// Controller rejected the command.
    #[display(fmt = "REJECTED")]
    Rejected,
    /// Generic failure.
    #[display(fmt = "FAILED")]
    Failed,
    /// RF timeout.
    #[display(fmt = "TIMEOUT")]
    Timeout,
}

impl NfcStatus {
    /// Whether the status is `Ok`.
    pub fn is_ok(&self) -> bool {
        *self == Self::Ok
    }
}

/// Status attached to a chunk of received data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStatus {
    /// More chunks of the same frame follow.
    Continue,
    /// Last chunk of the frame.
    Final,
    /// Reception failed; the frame is discarded.
    Failed,
}

/// NDEF access mode reported by detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NdefMode {
    /// Not yet detected, or no NDEF.
    #[default]
    #[display(fmt = "UNKNOWN")]
    Unknown,
    /// NDEF present and locked.
    #[display(fmt = "READ_ONLY")]
    ReadOnly,
    /// NDEF present and writable.
    #[display(fmt = "READ_WRITE")]
    ReadWrite,
}

/// Connection state of the single RF-connected tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ConnectionState {
    /// No tag connected, or the last reselect failed.
    #[default]
    #[display(fmt = "IDLE")]
    Idle,
    /// Tag deactivated to sleep, waiting for reactivation.
    #[display(fmt = "SLEEP")]
    Sleep,
    /// Tag activated and ready for exchange.
    #[display(fmt = "ACTIVE")]
    Active,
    /// Entered after an NDEF read timed out; cleared by the next activation.
    #[display(fmt = "INACTIVE")]
    Inactive,
}

/// Target state requested by, or reported after, a deactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeactivationKind {
    /// Target is released.
    #[display(fmt = "IDLE")]
    Idle,
    /// Target is put to sleep, keeping its handle.
    #[display(fmt = "SLEEP")]
    Sleep,
    /// Controller returns to discovery.
    #[display(fmt = "DISCOVERY")]
    Discovery,
}
