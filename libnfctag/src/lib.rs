// libnfctag/src/lib.rs

//! libnfctag
//!
//! Tag-side NFC protocol engine. Turns the asynchronous notifications of an
//! NFC controller library into a synchronous, typed tag API: connect,
//! transceive, NDEF access and field presence monitoring.
#![warn(missing_docs)]

#[cfg(feature = "async")]
pub mod asynchronous;
pub mod constants;
pub mod discovery;
pub mod engine;
/// Crate error type
pub mod error;
pub mod prelude;
pub mod protocol;
pub mod tag;
pub mod test_support;
pub mod transport;
/// Identifiers and protocol enums shared by every module
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the enums in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
