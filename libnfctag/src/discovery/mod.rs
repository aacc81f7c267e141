// libnfctag/src/discovery/mod.rs

//! Discovery rounds: batching simultaneous notifications and choosing which
//! candidate to activate.

/// Batching of discovery notifications into rounds
pub mod aggregator;
/// Candidate choice within a round
pub mod selection;

pub use aggregator::{Aggregation, DiscoveryAggregator, DiscoveryBatch};
pub use selection::{Selection, SelectionSequencer};
