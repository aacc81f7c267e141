// libnfctag/src/tag/record.rs

use crate::tag::RfTechParams;
use crate::types::{DiscoveryId, Protocol, RfInterface, Technology, Uid};

/// One physically discovered tag.
///
/// `technologies` and the per-technology sequences are parallel: index `i`
/// of `protocols`, `handles`, `poll_bytes`, `activated_bytes` and `params`
/// describe `technologies[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub(crate) discovery_id: DiscoveryId,
    pub(crate) technologies: Vec<Technology>,
    pub(crate) protocols: Vec<Protocol>,
    pub(crate) handles: Vec<DiscoveryId>,
    pub(crate) poll_bytes: Vec<Vec<u8>>,
    pub(crate) activated_bytes: Vec<Vec<u8>>,
    pub(crate) params: Vec<RfTechParams>,
    pub(crate) uid: Uid,
    pub(crate) connected_tech_index: Option<usize>,
}

impl TagRecord {
    /// Handle of the first technology; identifies the tag upward.
    pub fn discovery_id(&self) -> DiscoveryId {
        self.discovery_id
    }

    /// Identifier bytes of the first technology.
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Technologies in discovery order.
    pub fn technologies(&self) -> &[Technology] {
        &self.technologies
    }

    /// Number of technologies; valid indices are below this.
    pub fn tech_count(&self) -> usize {
        self.technologies.len()
    }

    /// Technology at `index`.
    pub fn technology(&self, index: usize) -> Option<Technology> {
        self.technologies.get(index).copied()
    }

    /// Protocol the technology at `index` was discovered with.
    pub fn protocol(&self, index: usize) -> Option<Protocol> {
        self.protocols.get(index).copied()
    }

    /// Discovery handle that reported the technology at `index`.
    pub fn handle(&self, index: usize) -> Option<DiscoveryId> {
        self.handles.get(index).copied()
    }

    /// Poll bytes exposed for the technology at `index` (ATQA/SAK, SENSB,
    /// PMm and system code, or flags and DSFID).
    pub fn poll_bytes(&self, index: usize) -> Option<&[u8]> {
        self.poll_bytes.get(index).map(Vec::as_slice)
    }

    /// Historical bytes (NFC-A) or higher layer response (NFC-B) of an
    /// ISO-DEP activation; empty otherwise.
    pub fn activated_bytes(&self, index: usize) -> Option<&[u8]> {
        self.activated_bytes.get(index).map(Vec::as_slice)
    }

    /// Raw poll parameters of the technology at `index`.
    pub fn params(&self, index: usize) -> Option<&RfTechParams> {
        self.params.get(index)
    }

    /// Technology currently selected over RF, if this tag is the connected one.
    pub fn connected_tech_index(&self) -> Option<usize> {
        self.connected_tech_index
    }

    /// First index carrying `tech`.
    pub fn index_of(&self, tech: Technology) -> Option<usize> {
        self.technologies.iter().position(|t| *t == tech)
    }

    /// Whether any technology was discovered under `protocol`.
    pub fn has_protocol(&self, protocol: Protocol) -> bool {
        self.protocols.contains(&protocol)
    }

    /// RF interface needed to talk to the technology at `index`. NfcA/NfcB
    /// on an ISO-DEP target use raw ISO14443-3 frames.
    pub fn interface_for(&self, index: usize) -> Option<RfInterface> {
        let tech = self.technology(index)?;
        let protocol = self.protocol(index)?;
        let interface = match (tech, protocol) {
            (Technology::NfcA | Technology::NfcB, Protocol::IsoDep) => RfInterface::Frame,
            _ => protocol.default_interface(),
        };
        Some(interface)
    }

    /// First technology reachable through `interface` on discovery handle `handle`.
    pub fn index_for(&self, handle: DiscoveryId, interface: RfInterface) -> Option<usize> {
        (0..self.tech_count())
            .find(|i| self.handles[*i] == handle && self.interface_for(*i) == Some(interface))
    }

    /// Two candidates of a multi-protocol tag share one record when both
    /// protocols are ISO-DEP and Mifare.
    pub fn is_multi_proto_mifare(&self) -> bool {
        self.has_protocol(Protocol::IsoDep) && self.has_protocol(Protocol::Mifare)
    }
}
