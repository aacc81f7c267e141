// libnfctag/src/discovery/aggregator.rs

use std::collections::HashSet;

use log::{debug, warn};

use crate::constants::MAX_DISCOVERY_BATCH;
use crate::protocol::is_sak28_pair;
use crate::transport::DiscoveryNotification;
use crate::types::Uid;

/// Candidates reported in one discovery round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryBatch {
    /// Notifications in arrival order
    pub candidates: Vec<DiscoveryNotification>,
    /// More than one distinct UID was seen
    pub is_multi_tag: bool,
    /// SAK28 pair detected: the Mifare candidate must not be selected
    pub skip_mifare: bool,
}

impl DiscoveryBatch {
    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True when nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of physical tags in the batch.
    pub fn distinct_uids(&self) -> usize {
        self.candidates
            .iter()
            .map(|c| c.params.uid())
            .collect::<HashSet<Uid>>()
            .len()
    }
}

/// Outcome of feeding one notification to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    /// The controller announced more notifications for this round
    Pending,
    /// The round is complete.
    Resolved(DiscoveryBatch),
    /// Nothing to surface (non-OK status on an empty round)
    Ignored,
}

/// Buffers simultaneous discovery notifications until the controller
/// reports the last one of the round.
#[derive(Debug)]
pub struct DiscoveryAggregator {
    max_batch: usize,
    discovery_index: usize,
    candidates: Vec<DiscoveryNotification>,
}

impl Default for DiscoveryAggregator {
    fn default() -> Self {
        Self::new(MAX_DISCOVERY_BATCH)
    }
}

impl DiscoveryAggregator {
    /// Aggregator that force-resolves after `max_batch` notifications (at least one).
    pub fn new(max_batch: usize) -> Self {
        Self {
            max_batch: max_batch.max(1),
            discovery_index: 0,
            candidates: Vec::new(),
        }
    }

    /// Notifications seen in the current round.
    pub fn discovery_index(&self) -> usize {
        self.discovery_index
    }

    /// Feed one notification. A batch is resolved on the last notification of
    /// a round, or early once `max_batch` is reached.
    pub fn on_notification(&mut self, notification: DiscoveryNotification) -> Aggregation {
        self.discovery_index += 1;
        let more = notification.more;

        if !notification.status.is_ok() {
            warn!(
                "discovery {}: status {}, dropped",
                notification.discovery_id, notification.status
            );
        } else if self.candidates.len() >= self.max_batch {
            warn!(
                "discovery {}: batch full ({}), dropped",
                notification.discovery_id, self.max_batch
            );
        } else {
            debug!(
                "discovery {}: protocol {} mode {} more={}",
                notification.discovery_id,
                notification.protocol,
                notification.params.mode(),
                more
            );
            self.candidates.push(notification);
        }

        if more {
            return Aggregation::Pending;
        }

        self.discovery_index = 0;
        if self.candidates.is_empty() {
            return Aggregation::Ignored;
        }
        Aggregation::Resolved(self.resolve())
    }

    /// Drop any partially collected round.
    pub fn reset(&mut self) {
        self.discovery_index = 0;
        self.candidates.clear();
    }

    fn resolve(&mut self) -> DiscoveryBatch {
        let candidates = std::mem::take(&mut self.candidates);
        let skip_mifare = candidates
            .iter()
            .enumerate()
            .any(|(i, a)| candidates[i + 1..].iter().any(|b| is_sak28_pair(a, b)));
        let mut batch = DiscoveryBatch {
            candidates,
            is_multi_tag: false,
            skip_mifare,
        };
        batch.is_multi_tag = batch.distinct_uids() > 1;
        debug!(
            "discovery round resolved: {} candidates, multi_tag={}, skip_mifare={}",
            batch.len(),
            batch.is_multi_tag,
            batch.skip_mifare
        );
        batch
    }
}
