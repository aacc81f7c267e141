// libnfctag/src/protocol/frames.rs

//! Raw frames and response checks the engine sends or inspects itself.

use crate::constants::{
    DESFIRE_VERSION_RESP_LEN, DESFIRE_VERSION_SW, EMPTY_NDEF_RECORD, FWT_UNIT_US, HALT_B_CMD,
    HALT_B_FRAME_LEN, MAX_FWI, T2T_ACK, T2T_SLEEP_FRAME,
};
use crate::tag::RfTechParams;
use crate::types::Protocol;

/// Frame that puts a frame-interface target to sleep before an interface
/// switch: SLP_REQ for Type 2 tags, HLTB built from NFCID0 for NFC-B.
/// Other targets get none.
pub fn halt_frame(protocol: Protocol, params: &RfTechParams) -> Option<Vec<u8>> {
    if protocol == Protocol::T2t {
        return Some(T2T_SLEEP_FRAME.to_vec());
    }
    let nfcid0 = params.nfcid0()?;
    let mut frame = Vec::with_capacity(HALT_B_FRAME_LEN);
    frame.push(HALT_B_CMD);
    frame.extend_from_slice(&nfcid0);
    Some(frame)
}

/// Bytes handed to the NDEF write command. An empty message becomes a single
/// empty record so the tag never receives a zero-length write.
pub fn ndef_write_payload(message: &[u8]) -> Vec<u8> {
    if message.is_empty() {
        EMPTY_NDEF_RECORD.to_vec()
    } else {
        message.to_vec()
    }
}

/// Response timeout derived from the FWI nibble of an NFC-A ATS (starting
/// at T0), in milliseconds. `None` when the ATS carries no TB(1) or the FWI
/// is reserved.
pub fn fwi_timeout_ms(ats: &[u8]) -> Option<u32> {
    let t0 = *ats.first()?;
    if t0 & 0x20 == 0 {
        return None;
    }
    let tb_index = if t0 & 0x10 != 0 { 2 } else { 1 };
    let fwi = ats.get(tb_index)? >> 4;
    if fwi > MAX_FWI {
        return None;
    }
    Some((FWT_UNIT_US << fwi).div_ceil(1000))
}

/// Historical bytes of an ATS starting at T0: whatever follows the
/// interface bytes announced by T0.
pub fn historical_bytes(ats: &[u8]) -> &[u8] {
    let Some(&t0) = ats.first() else {
        return &[];
    };
    let interface_bytes = [0x10u8, 0x20, 0x40]
        .iter()
        .filter(|bit| t0 & **bit != 0)
        .count();
    ats.get(1 + interface_bytes..).unwrap_or(&[])
}

/// A single-byte Type 2 response other than ACK.
pub fn is_t2t_nack(response: &[u8]) -> bool {
    response.len() == 1 && response[0] != T2T_ACK
}

/// Outcome of checking a legacy Mifare Classic response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MifareReply {
    /// Payload to hand back unchanged
    Data(Vec<u8>),
    /// 4-bit NACK; the tag has dropped to HALT and needs a reconnect
    Nack(u8),
}

/// Classify a legacy Mifare response: a lone byte without the ACK nibble is
/// a NACK, anything else is data.
pub fn check_mifare_response(response: &[u8]) -> MifareReply {
    match response {
        [b] if (*b & 0x0f) != T2T_ACK => MifareReply::Nack(*b),
        _ => MifareReply::Data(response.to_vec()),
    }
}

/// DESFire GetVersion answers with 7 bytes of hardware info and 91 AF.
pub fn is_desfire_version_response(response: &[u8]) -> bool {
    response.len() == DESFIRE_VERSION_RESP_LEN && response[7..9] == DESFIRE_VERSION_SW
}
