// libnfctag/src/tag/mod.rs

//! Discovered tag model: poll parameters, per-tag records and the registry
//! that owns them.

/// Record assembly from activations
pub mod builder;
/// Poll parameters per RF technology
pub mod params;
/// Immutable per-tag record
pub mod record;
/// Known tags and listener callbacks
pub mod registry;

pub use builder::TagRecordBuilder;
pub use params::RfTechParams;
pub use record::TagRecord;
pub use registry::{TagListener, TagRegistry};
