//! Small helpers shared across the crate: hex conversion at the API boundary,
//! the wait budgets and lock recovery.

/// Hex conversion
pub mod hex;
pub(crate) mod sync;
/// Wait budgets
pub mod timeout;

pub use hex::*;
pub use timeout::ms;
