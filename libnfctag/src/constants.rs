// libnfctag/src/constants.rs
//! Protocol constants and vendor quirk signatures used across the crate

/// 4-bit ACK returned by Type 2 and Mifare Classic tags
pub const T2T_ACK: u8 = 0x0a;

/// Type 2 SLP_REQ (HLTA) frame sent before leaving the frame interface
pub const T2T_SLEEP_FRAME: [u8; 2] = [0x50, 0x00];

/// First byte of an ISO14443-3B HLTB frame; followed by the 4-byte NFCID0
pub const HALT_B_CMD: u8 = 0x50;
/// Full HLTB frame length
pub const HALT_B_FRAME_LEN: usize = 5;

/// MIFARE DESFire GetVersion APDU used to confirm NDEF formatability
pub const DESFIRE_GET_VERSION: [u8; 5] = [0x90, 0x60, 0x00, 0x00, 0x00];
/// Length of the GetVersion response that identifies a DESFire
pub const DESFIRE_VERSION_RESP_LEN: usize = 9;
/// Trailing status word of the first GetVersion frame ("additional frame")
pub const DESFIRE_VERSION_SW: [u8; 2] = [0x91, 0xaf];

/// Empty NDEF record: MB|ME|SR with TNF=empty, zero type and payload length
pub const EMPTY_NDEF_RECORD: [u8; 3] = [0xd0, 0x00, 0x00];

/// NXP manufacturer byte (first UID byte) of Ultralight / NTAG parts
pub const MIFARE_UL_MANUFACTURER: u8 = 0x04;
/// ATQA of Ultralight / NTAG parts
pub const MIFARE_UL_ATQA: [u8; 2] = [0x44, 0x00];
/// SAK values accepted for Ultralight / NTAG parts
pub const MIFARE_UL_SAKS: [u8; 2] = [0x00, 0x04];

/// ATQA first byte values seen on DESFire EV1/EV2 parts (7-byte and 4-byte UID)
pub const DESFIRE_ATQA0: [u8; 2] = [0x44, 0x04];
/// Second ATQA byte of DESFire parts
pub const DESFIRE_ATQA1: u8 = 0x03;
/// DESFire SAK (ISO 14443-4 compliant)
pub const DESFIRE_SAK: u8 = 0x20;

/// Cashbee transit cards answer with this ATQA/SAK pair under ISO-DEP
pub const CASHBEE_ATQA: [u8; 2] = [0x08, 0x00];
/// Cashbee SAK
pub const CASHBEE_SAK: u8 = 0x20;

/// FeliCa Lite(-S) system code; required for T3T formatting
pub const FELICA_LITE_SYSTEM_CODE: u16 = 0x88b4;

/// Largest frame waiting time integer; 15 is RFU
pub const MAX_FWI: u8 = 14;
/// One FWI step expressed in microseconds (ISO-DEP default FWT unit)
pub const FWT_UNIT_US: u32 = 618;

/// Upper bound for discovery notifications collected in one round
pub const MAX_DISCOVERY_BATCH: usize = 10;
