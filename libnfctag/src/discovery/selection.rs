// libnfctag/src/discovery/selection.rs

use log::debug;

use crate::discovery::DiscoveryBatch;
use crate::transport::DiscoveryNotification;
use crate::types::{DiscoveryId, Protocol, RfInterface, Uid};

/// What the engine must do to activate the chosen candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Issue a select command
    Select {
        /// Position in the batch
        index: usize,
        /// Controller handle of the candidate
        id: DiscoveryId,
        /// Protocol to activate
        protocol: Protocol,
        /// Interface to activate it with
        interface: RfInterface,
    },
    /// The hardware already sits on this candidate; treat it as activated
    /// without selecting again
    Replay {
        /// Position in the batch
        index: usize,
    },
}

impl Selection {
    /// Batch position of the chosen candidate.
    pub fn index(&self) -> usize {
        match self {
            Self::Select { index, .. } | Self::Replay { index } => *index,
        }
    }
}

/// Walks a resolved [`DiscoveryBatch`] choosing which candidate to activate.
#[derive(Debug, Default)]
pub struct SelectionSequencer {
    batch: DiscoveryBatch,
    selected: Option<usize>,
}

impl SelectionSequencer {
    /// Sequencer with an empty round.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new round. Peer-to-peer candidates are never chosen; with
    /// the SAK28 quirk the Mifare candidate is skipped and the remaining
    /// one is replayed.
    pub fn select_first(&mut self, batch: DiscoveryBatch) -> Option<Selection> {
        self.batch = batch;
        self.selected = None;
        let index = self.find_from(0)?;
        self.selected = Some(index);
        if self.batch.skip_mifare {
            debug!("selection: replay candidate {}", index);
            return Some(Selection::Replay { index });
        }
        Some(self.select_at(index))
    }

    /// Choose the next selectable candidate after the current one.
    pub fn select_next(&mut self) -> Option<Selection> {
        let start = self.selected.map_or(0, |i| i + 1);
        let index = self.find_from(start)?;
        self.selected = Some(index);
        Some(self.select_at(index))
    }

    /// Whether any selectable candidate remains after the current one.
    pub fn has_next(&self) -> bool {
        let start = self.selected.map_or(0, |i| i + 1);
        self.find_from(start).is_some()
    }

    /// Whether a later candidate reports the same UID as the selected one,
    /// i.e. the same physical tag under another protocol.
    pub fn has_next_for_same_tag(&self) -> bool {
        let Some(current) = self.selected() else {
            return false;
        };
        let uid = current.params.uid();
        let start = self.selected.map_or(0, |i| i + 1);
        self.batch
            .candidates
            .iter()
            .skip(start)
            .any(|c| self.is_selectable(c) && c.params.uid() == uid)
    }

    /// Candidate chosen last.
    pub fn selected(&self) -> Option<&DiscoveryNotification> {
        self.selected.and_then(|i| self.batch.candidates.get(i))
    }

    /// Candidate at `index` in the current batch.
    pub fn candidate(&self, index: usize) -> Option<&DiscoveryNotification> {
        self.batch.candidates.get(index)
    }

    /// Batch of the current round.
    pub fn batch(&self) -> &DiscoveryBatch {
        &self.batch
    }

    /// Candidates of `uid` that were skipped by the Mifare quirk.
    pub fn skipped_for(&self, uid: &Uid) -> Vec<DiscoveryNotification> {
        if !self.batch.skip_mifare {
            return Vec::new();
        }
        self.batch
            .candidates
            .iter()
            .filter(|c| c.protocol == Protocol::Mifare && c.params.uid() == *uid)
            .cloned()
            .collect()
    }

    /// Forget the round.
    pub fn reset(&mut self) {
        self.batch = DiscoveryBatch::default();
        self.selected = None;
    }

    fn is_selectable(&self, c: &DiscoveryNotification) -> bool {
        match c.protocol {
            Protocol::NfcDep => false,
            Protocol::Mifare => !self.batch.skip_mifare,
            _ => true,
        }
    }

    fn find_from(&self, start: usize) -> Option<usize> {
        (start..self.batch.candidates.len()).find(|i| self.is_selectable(&self.batch.candidates[*i]))
    }

    fn select_at(&self, index: usize) -> Selection {
        let c = &self.batch.candidates[index];
        let selection = Selection::Select {
            index,
            id: c.discovery_id,
            protocol: c.protocol,
            interface: c.protocol.default_interface(),
        };
        debug!("selection: {:?}", selection);
        selection
    }
}
