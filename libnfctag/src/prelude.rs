// libnfctag/src/prelude.rs

//! Common imports for engine users.

pub use crate::engine::{EngineConfig, NdefDetection, PresencePause, TagEngine, TagEngineBuilder};
pub use crate::tag::{TagListener, TagRecord};
pub use crate::transport::{HardwareChannel, HardwareEvent};
pub use crate::{
    ConnectionState, DiscoveryId, Error, NdefMode, NfcStatus, Protocol, Result, RfInterface,
    Technology, Uid,
};

#[cfg(feature = "async")]
pub use crate::asynchronous::{AsyncTagEngine, AsyncTagOps};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, ms, parse_hex};
