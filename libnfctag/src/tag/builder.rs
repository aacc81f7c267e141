// libnfctag/src/tag/builder.rs

use log::warn;

use crate::protocol::{historical_bytes, is_mifare_ultralight};
use crate::tag::{RfTechParams, TagRecord};
use crate::transport::{ActivationNotification, DiscoveryNotification};
use crate::types::{DiscoveryId, Protocol, RfTechMode, Technology, Uid};
use crate::{Error, Result};

/// Accumulates the technologies of one physical tag from one or more
/// activations and turns them into a [`TagRecord`].
#[derive(Debug, Default, Clone)]
pub struct TagRecordBuilder {
    discovery_id: Option<DiscoveryId>,
    uid: Option<Uid>,
    technologies: Vec<Technology>,
    protocols: Vec<Protocol>,
    handles: Vec<DiscoveryId>,
    poll_bytes: Vec<Vec<u8>>,
    activated_bytes: Vec<Vec<u8>>,
    params: Vec<RfTechParams>,
}

impl TagRecordBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the technologies of an activated candidate.
    pub fn activation(mut self, activation: &ActivationNotification) -> Self {
        self.push_activation(activation);
        self
    }

    /// Add the technologies of a candidate that was never activated.
    pub fn discovery(mut self, notification: &DiscoveryNotification) -> Self {
        self.push_discovery(notification);
        self
    }

    /// In-place form of [`activation`](Self::activation).
    pub fn push_activation(&mut self, activation: &ActivationNotification) {
        self.push(
            activation.discovery_id,
            activation.protocol,
            &activation.params,
            &activation.activation_bytes,
        );
    }

    /// In-place form of [`discovery`](Self::discovery).
    pub fn push_discovery(&mut self, notification: &DiscoveryNotification) {
        self.push(
            notification.discovery_id,
            notification.protocol,
            &notification.params,
            &[],
        );
    }

    /// Handle of the first candidate added; it keys the record.
    pub fn discovery_id(&self) -> Option<DiscoveryId> {
        self.discovery_id
    }

    /// True until a candidate is added.
    pub fn is_empty(&self) -> bool {
        self.technologies.is_empty()
    }

    /// Finish the record. Fails when nothing was added.
    pub fn build(self) -> Result<TagRecord> {
        let discovery_id = self.discovery_id.ok_or_else(|| {
            Error::UnsupportedOperation("no activation to build a tag from".into())
        })?;
        if self.technologies.is_empty() {
            return Err(Error::UnsupportedOperation(format!(
                "tag {} exposes no supported technology",
                discovery_id
            )));
        }

        Ok(TagRecord {
            discovery_id,
            technologies: self.technologies,
            protocols: self.protocols,
            handles: self.handles,
            poll_bytes: self.poll_bytes,
            activated_bytes: self.activated_bytes,
            params: self.params,
            uid: self.uid.unwrap_or_default(),
            connected_tech_index: None,
        })
    }

    fn push(
        &mut self,
        id: DiscoveryId,
        protocol: Protocol,
        params: &RfTechParams,
        activation_bytes: &[u8],
    ) {
        if self.discovery_id.is_none() {
            self.discovery_id = Some(id);
            self.uid = Some(params.uid());
        }

        let poll = params.poll_bytes();
        let entries: Vec<(Technology, Vec<u8>, Vec<u8>)> = match protocol {
            Protocol::T1t => vec![(Technology::NfcA, poll, Vec::new())],
            Protocol::T2t => {
                let mut v = vec![(Technology::NfcA, poll.clone(), Vec::new())];
                if is_mifare_ultralight(params) {
                    v.push((Technology::MifareUltralight, poll, Vec::new()));
                }
                v
            }
            Protocol::T3t => vec![(Technology::NfcF, poll, Vec::new())],
            Protocol::IsoDep => match params.mode() {
                RfTechMode::PollA => vec![
                    (
                        Technology::IsoDep,
                        Vec::new(),
                        historical_bytes(activation_bytes).to_vec(),
                    ),
                    (Technology::NfcA, poll, Vec::new()),
                ],
                RfTechMode::PollB => vec![
                    (Technology::IsoDep, Vec::new(), activation_bytes.to_vec()),
                    (Technology::NfcB, poll, Vec::new()),
                ],
                _ => vec![(Technology::IsoDep, Vec::new(), activation_bytes.to_vec())],
            },
            Protocol::T5t => vec![(Technology::NfcV, poll, Vec::new())],
            Protocol::Mifare => vec![
                (Technology::NfcA, poll.clone(), Vec::new()),
                (Technology::MifareClassic, poll, Vec::new()),
            ],
            Protocol::Kovio => vec![(Technology::NfcBarcode, poll, Vec::new())],
            Protocol::T3bt => vec![(Technology::NfcB, poll, Vec::new())],
            Protocol::NfcDep | Protocol::Undetermined => {
                warn!("tag {}: protocol {} not supported", id, protocol);
                Vec::new()
            }
        };

        for (tech, poll, activated) in entries {
            if self.technologies.contains(&tech) {
                continue;
            }
            self.technologies.push(tech);
            self.protocols.push(protocol);
            self.handles.push(id);
            self.poll_bytes.push(poll);
            self.activated_bytes.push(activated);
            self.params.push(params.clone());
        }
    }
}
