//! Wait budgets used by the engine.
//!
//! Every blocking wait in the engine is bounded; these are the built-in
//! budgets `EngineConfig::default()` starts from.

use std::time::Duration;

/// Wait for a sleep or activation confirmation during reselect.
pub const SELECT_WAIT_MS: u64 = 1000;
/// Per-attempt wait once the first select confirmation was missed.
pub const SELECT_RETRY_WAIT_MS: u64 = 500;
/// Additional select attempts after the first one.
pub const MAX_SELECT_RETRIES: u32 = 3;
/// Wait for any answer to a halt frame before deactivating.
pub const HALT_WAIT_MS: u64 = 100;
/// NDEF detection.
pub const NDEF_DETECT_WAIT_MS: u64 = 3000;
/// NDEF read; large messages on slow tags take several seconds.
pub const NDEF_READ_WAIT_MS: u64 = 5000;
/// NDEF write.
pub const NDEF_WRITE_WAIT_MS: u64 = 2000;
/// Format.
pub const FORMAT_WAIT_MS: u64 = 2000;
/// Each read-only attempt.
pub const READ_ONLY_WAIT_MS: u64 = 1000;
/// One presence check answer.
pub const PRESENCE_WAIT_MS: u64 = 1000;
/// Presence polling interval used when the caller passes zero.
pub const DEFAULT_PRESENCE_DELAY_MS: u64 = 125;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
