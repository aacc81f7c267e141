// libnfctag/src/protocol/mod.rs

//! Frame helpers and vendor quirk detection.

pub mod frames;
pub mod quirks;

pub use frames::{
    MifareReply, check_mifare_response, fwi_timeout_ms, halt_frame, historical_bytes,
    is_desfire_version_response, is_t2t_nack, ndef_write_payload,
};
pub use quirks::{
    is_cashbee, is_felica_lite, is_mifare_desfire, is_mifare_ultralight, is_sak28_pair,
};
