// libnfctag/src/protocol/quirks.rs

//! Vendor signatures identified empirically on real parts. Match them
//! exactly; they cannot be derived from the NFC Forum documents.

use crate::constants::{
    CASHBEE_ATQA, CASHBEE_SAK, DESFIRE_ATQA0, DESFIRE_ATQA1, DESFIRE_SAK,
    FELICA_LITE_SYSTEM_CODE, MIFARE_UL_ATQA, MIFARE_UL_MANUFACTURER, MIFARE_UL_SAKS,
};
use crate::tag::RfTechParams;
use crate::transport::DiscoveryNotification;
use crate::types::{DiscoveryId, Protocol, RfTechMode};

/// NXP Ultralight family (AN10833): ATQA 44 00, SAK 00 or 04, UID starting
/// with the NXP manufacturer byte.
pub fn is_mifare_ultralight(params: &RfTechParams) -> bool {
    match params {
        RfTechParams::PollA {
            sens_res,
            nfcid1,
            sel_res,
        } => {
            *sens_res == MIFARE_UL_ATQA
                && MIFARE_UL_SAKS.contains(sel_res)
                && nfcid1.first() == Some(&MIFARE_UL_MANUFACTURER)
        }
        _ => false,
    }
}

/// DESFire by ATQA and SAK. Formatability is confirmed later with GetVersion.
pub fn is_mifare_desfire(params: &RfTechParams) -> bool {
    match params {
        RfTechParams::PollA {
            sens_res, sel_res, ..
        } => {
            DESFIRE_ATQA0.contains(&sens_res[0])
                && sens_res[1] == DESFIRE_ATQA1
                && *sel_res == DESFIRE_SAK
        }
        _ => false,
    }
}

/// Cashbee cards never reach Sleep reliably; reselect restarts discovery
/// for them instead.
pub fn is_cashbee(protocol: Protocol, params: &RfTechParams) -> bool {
    match params {
        RfTechParams::PollA {
            sens_res, sel_res, ..
        } => protocol == Protocol::IsoDep && *sens_res == CASHBEE_ATQA && *sel_res == CASHBEE_SAK,
        _ => false,
    }
}

/// FeliCa Lite(-S), the only T3T this engine formats.
pub fn is_felica_lite(params: &RfTechParams) -> bool {
    params.system_code() == Some(FELICA_LITE_SYSTEM_CODE)
}

/// SAK28: one Mifare Classic + ISO-DEP part reported as discovery ids 1 and
/// 2 under POLL_A with identical NFCID1, once per protocol.
pub fn is_sak28_pair(first: &DiscoveryNotification, second: &DiscoveryNotification) -> bool {
    let ids = (first.discovery_id, second.discovery_id);
    if ids != (DiscoveryId::new(1), DiscoveryId::new(2)) {
        return false;
    }
    if first.params.mode() != RfTechMode::PollA || second.params.mode() != RfTechMode::PollA {
        return false;
    }
    let protocols = (first.protocol, second.protocol);
    let mixed = matches!(
        protocols,
        (Protocol::IsoDep, Protocol::Mifare) | (Protocol::Mifare, Protocol::IsoDep)
    );
    mixed && first.params.uid() == second.params.uid()
}
