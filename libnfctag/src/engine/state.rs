// libnfctag/src/engine/state.rs

use crate::discovery::{DiscoveryAggregator, SelectionSequencer};
use crate::tag::{RfTechParams, TagRecordBuilder};
use crate::types::{ConnectionState, DiscoveryId, Protocol, RfInterface};

/// The single RF connection. Updated by the event thread on confirmed
/// hardware events; callers only read it and request transitions.
#[derive(Debug, Default, Clone)]
pub(crate) struct Connection {
    pub state: ConnectionState,
    /// Record of the published tag this connection belongs to
    pub tag: Option<DiscoveryId>,
    /// Discovery handle of the current activation
    pub handle: Option<DiscoveryId>,
    pub interface: Option<RfInterface>,
    pub protocol: Option<Protocol>,
    pub tech_index: Option<usize>,
    pub params: Option<RfTechParams>,
    /// A reselect owns the deactivate/activate events
    pub reselecting: bool,
    /// Set by an NDEF read timeout, cleared by the next activation
    pub ndef_read_timed_out: bool,
}

impl Connection {
    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }
}

/// Quirks learned about the connected tag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuirkFlags {
    /// ISO-DEP + Mifare tag whose Mifare interface could not be selected
    pub multi_proto_mifare: bool,
    /// NDEF detection must not touch the hardware
    pub skip_ndef_read: bool,
}

/// Event-thread side of a discovery round.
#[derive(Debug)]
pub(crate) struct DiscoveryState {
    pub aggregator: DiscoveryAggregator,
    pub sequencer: SelectionSequencer,
    /// Technologies collected while walking the candidates of one tag
    pub pending: Option<TagRecordBuilder>,
}

impl DiscoveryState {
    pub fn new(max_batch: usize) -> Self {
        Self {
            aggregator: DiscoveryAggregator::new(max_batch),
            sequencer: SelectionSequencer::new(),
            pending: None,
        }
    }

    pub fn reset(&mut self) {
        self.aggregator.reset();
        self.sequencer.reset();
        self.pending = None;
    }
}
