// libnfctag/src/transport/traits.rs

use std::sync::Weak;

use crate::Result;
use crate::transport::events::EventSink;
use crate::types::{DiscoveryId, Protocol, RfInterface};

/// Command side of the vendor controller library.
///
/// Every method only *issues* a command. Completion arrives later as a
/// [`HardwareEvent`](crate::transport::HardwareEvent) delivered to the sink
/// registered with [`register_sink`](Self::register_sink), on the library's
/// own callback thread. An `Err` means the command was refused outright.
pub trait HardwareChannel: Send + Sync {
    /// Register the sink receiving asynchronous events. Called once by the
    /// engine builder.
    fn register_sink(&self, sink: Weak<dyn EventSink>);

    /// Send a raw frame to the activated target
    fn send_raw_frame(&self, data: &[u8]) -> Result<()>;

    /// Send a frame through the legacy Mifare Classic reader path. Default
    /// falls back to `send_raw_frame` for libraries without a dedicated path.
    fn send_mifare_frame(&self, data: &[u8]) -> Result<()> {
        self.send_raw_frame(data)
    }

    /// Deactivate the target to Sleep (`true`) or Idle (`false`)
    fn deactivate(&self, to_sleep: bool) -> Result<()>;

    /// Select a sleeping or discovered target on the given RF interface
    fn select(&self, id: DiscoveryId, protocol: Protocol, interface: RfInterface) -> Result<()>;

    /// Start (`true`) or stop (`false`) RF discovery
    fn start_rf_discovery(&self, start: bool) -> Result<()>;

    /// Check whether the activated target still answers
    fn presence_check(&self) -> Result<()>;

    /// Run NDEF detection on the activated target
    fn detect_ndef(&self) -> Result<()>;

    /// Read the stored NDEF message
    fn read_ndef(&self) -> Result<()>;

    /// Legacy Mifare Classic NDEF read. Default falls back to `read_ndef`.
    fn read_mifare_ndef(&self) -> Result<()> {
        self.read_ndef()
    }

    /// Write an NDEF message
    fn write_ndef(&self, message: &[u8]) -> Result<()>;

    /// Format the tag for NDEF with the given key
    fn format_tag(&self, key: &[u8]) -> Result<()>;

    /// Make the tag read-only; `hard_lock` requests the permanent variant
    fn set_tag_read_only(&self, hard_lock: bool) -> Result<()>;
}
