// libnfctag/src/transport/mod.rs

//! Boundary to the vendor controller library: commands out, events in.

/// Command log entries
pub mod command;
/// Events delivered by the controller
pub mod events;
/// In-memory controller for tests and benches
pub mod mock;
/// Controller trait
pub mod traits;

pub use command::Command;
pub use events::{
    ActivationNotification, DiscoveryNotification, EventSink, HardwareEvent, NdefDetectResult,
};
pub use mock::{MockChannel, Reply};
pub use traits::HardwareChannel;
