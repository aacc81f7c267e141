// libnfctag/src/tag/params.rs

use crate::types::{RfTechMode, Uid};

/// Technology-specific poll parameters reported with a discovery or an
/// activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RfTechParams {
    /// NFC-A
    PollA {
        /// ATQA
        sens_res: [u8; 2],
        /// UID, 4, 7 or 10 bytes
        nfcid1: Vec<u8>,
        /// SAK
        sel_res: u8,
    },
    /// NFC-B
    PollB {
        /// SENSB_RES without the leading 0x50: NFCID0, application data,
        /// protocol info.
        sensb_res: Vec<u8>,
    },
    /// NFC-F
    PollF {
        /// 1 for 212 kbps, 2 for 424 kbps
        bit_rate: u8,
        /// SENSF_RES without the response code: NFCID2, PMm and, when
        /// requested, the system code.
        sensf_res: Vec<u8>,
    },
    /// NFC-V
    PollV {
        /// Inventory response flags
        res_flag: u8,
        /// Data storage format identifier
        dsfid: u8,
        /// UID as reported by the controller
        uid: [u8; 8],
    },
    /// Kovio barcode
    PollKovio {
        /// Raw barcode bytes
        barcode: Vec<u8>,
    },
}

impl RfTechParams {
    /// Technology and mode these parameters were polled with.
    pub fn mode(&self) -> RfTechMode {
        match self {
            Self::PollA { .. } => RfTechMode::PollA,
            Self::PollB { .. } => RfTechMode::PollB,
            Self::PollF { .. } => RfTechMode::PollF,
            Self::PollV { .. } => RfTechMode::PollV,
            Self::PollKovio { .. } => RfTechMode::PollKovio,
        }
    }

    /// Identifier used to recognise the same physical tag across
    /// notifications.
    pub fn uid(&self) -> Uid {
        match self {
            Self::PollA { nfcid1, .. } => Uid::from(&nfcid1[..]),
            Self::PollB { sensb_res } => Uid::from(prefix(sensb_res, 4)),
            Self::PollF { sensf_res, .. } => Uid::from(prefix(sensf_res, 8)),
            Self::PollV { uid, .. } => Uid::from(&uid[..]),
            Self::PollKovio { barcode } => Uid::from(&barcode[..]),
        }
    }

    /// SAK of an NFC-A target.
    pub fn sak(&self) -> Option<u8> {
        match self {
            Self::PollA { sel_res, .. } => Some(*sel_res),
            _ => None,
        }
    }

    /// ATQA of an NFC-A target.
    pub fn atqa(&self) -> Option<[u8; 2]> {
        match self {
            Self::PollA { sens_res, .. } => Some(*sens_res),
            _ => None,
        }
    }

    /// NFCID0 of an NFC-B target, needed to build HLTB.
    pub fn nfcid0(&self) -> Option<[u8; 4]> {
        match self {
            Self::PollB { sensb_res } if sensb_res.len() >= 4 => {
                let mut id = [0u8; 4];
                id.copy_from_slice(&sensb_res[..4]);
                Some(id)
            }
            _ => None,
        }
    }

    /// System code of an NFC-F target, if the poll requested it.
    pub fn system_code(&self) -> Option<u16> {
        match self {
            Self::PollF { sensf_res, .. } if sensf_res.len() >= 18 => {
                Some(u16::from_be_bytes([sensf_res[16], sensf_res[17]]))
            }
            _ => None,
        }
    }

    /// Poll bytes exposed for the technology derived from these params:
    /// ATQA+SAK, application data + protocol info, PMm + system code, or
    /// response flags + DSFID.
    pub fn poll_bytes(&self) -> Vec<u8> {
        match self {
            Self::PollA {
                sens_res, sel_res, ..
            } => vec![sens_res[0], sens_res[1], *sel_res],
            Self::PollB { sensb_res } => slice_or_empty(sensb_res, 4, 11).to_vec(),
            Self::PollF { sensf_res, .. } => slice_or_empty(sensf_res, 8, 18).to_vec(),
            Self::PollV { res_flag, dsfid, .. } => vec![*res_flag, *dsfid],
            Self::PollKovio { .. } => Vec::new(),
        }
    }
}

fn prefix(bytes: &[u8], len: usize) -> &[u8] {
    &bytes[..bytes.len().min(len)]
}

fn slice_or_empty(bytes: &[u8], start: usize, end: usize) -> &[u8] {
    if bytes.len() <= start {
        return &[];
    }
    &bytes[start..bytes.len().min(end)]
}
