// libnfctag/src/transport/command.rs

use crate::types::{DiscoveryId, Protocol, RfInterface};

/// Record of one command issued through a [`HardwareChannel`]. Used by the
/// mock channel and by logs.
///
/// [`HardwareChannel`]: crate::transport::HardwareChannel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// [`send_raw_frame`](crate::transport::HardwareChannel::send_raw_frame)
    RawFrame(Vec<u8>),
    /// Frame sent through the legacy Mifare reader path
    MifareFrame(Vec<u8>),
    /// Target deactivation
    Deactivate {
        /// Sleep rather than Idle
        to_sleep: bool,
    },
    /// Target selection
    Select {
        /// Discovery handle
        id: DiscoveryId,
        /// Protocol to activate
        protocol: Protocol,
        /// Interface to activate it with
        interface: RfInterface,
    },
    /// Discovery start or stop
    RfDiscovery {
        /// Start rather than stop
        start: bool,
    },
    /// Presence check
    PresenceCheck,
    /// NDEF detection
    DetectNdef,
    /// NDEF read
    ReadNdef {
        /// Issued through the legacy Mifare path
        mifare: bool,
    },
    /// NDEF write of the given message
    WriteNdef(Vec<u8>),
    /// Format with the given key
    Format(Vec<u8>),
    /// Read-only request
    SetReadOnly {
        /// Permanent lock
        hard_lock: bool,
    },
}

impl Command {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RawFrame(_) => "raw-frame",
            Self::MifareFrame(_) => "mifare-frame",
            Self::Deactivate { .. } => "deactivate",
            Self::Select { .. } => "select",
            Self::RfDiscovery { .. } => "rf-discovery",
            Self::PresenceCheck => "presence-check",
            Self::DetectNdef => "detect-ndef",
            Self::ReadNdef { .. } => "read-ndef",
            Self::WriteNdef(_) => "write-ndef",
            Self::Format(_) => "format",
            Self::SetReadOnly { .. } => "set-read-only",
        }
    }

    /// For counting selects in tests.
    pub fn is_select(&self) -> bool {
        matches!(self, Self::Select { .. })
    }
}
