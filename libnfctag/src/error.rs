// libnfctag/src/error.rs

use thiserror::Error;

use crate::types::{NfcStatus, RfInterface};

/// Common error type for every engine operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The engine was built without a controller
    #[error("no hardware channel configured")]
    ChannelMissing,

    /// No tag is connected, or the connected tag is not activated
    #[error("no tag is active")]
    NotActive,

    /// Another operation owns the tag
    #[error("engine busy: {0}")]
    Busy(String),

    /// The hardware did not answer within the wait budget
    #[error("{operation} timed out")]
    Timeout {
        /// Operation that was waiting
        operation: &'static str,
    },

    /// The wait was force-woken by `abort_wait` or shutdown
    #[error("{operation} aborted")]
    Aborted {
        /// Operation that was waiting
        operation: &'static str,
    },

    /// The requested technology needs an interface the tag cannot switch to
    #[error("cannot switch from {from} to {to}")]
    ProtocolMismatch {
        /// Interface in use
        from: RfInterface,
        /// Interface requested
        to: RfInterface,
    },

    /// Reactivation on the named interface did not complete
    #[error("reselect to {0} failed")]
    ReselectFailed(RfInterface),

    /// Detection found no NDEF support
    #[error("tag is not ndef capable")]
    NdefNotCapable,

    /// Controller refused or failed the format
    #[error("ndef format failed")]
    FormatFailed,

    /// Both the hard and the soft lock were refused
    #[error("set read-only failed: status={0}")]
    ReadOnlyFailed(NfcStatus),

    /// Operation is not available for this tag
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// `connect` was given an index past the tag's technology list
    #[error("invalid technology index {index} (tag has {count})")]
    InvalidTechIndex {
        /// Index requested
        index: usize,
        /// Technologies the tag has
        count: usize,
    },

    /// Hex argument could not be parsed
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Argument out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Controller reported a failure status
    #[error("hardware error: status={0}")]
    Hardware(NfcStatus),
}

impl Error {
    /// Whether this error came from a wait that was force-woken or expired.
    pub fn is_wait_failure(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Aborted { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
