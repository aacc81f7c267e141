// fixtures.rs: tags and controller answers shared by the integration tests

use libnfctag::test_support::{discovery, poll_a};
use libnfctag::transport::{DiscoveryNotification, HardwareEvent, NdefDetectResult};
use libnfctag::types::{NdefMode, NfcStatus, Protocol};

pub const UL_UID: [u8; 7] = [0x04, 0x51, 0x2b, 0x7a, 0x3e, 0x5d, 0x80];
pub const ISO_UID: [u8; 4] = [0x08, 0x4f, 0x12, 0xa9];
pub const SAK28_UID: [u8; 4] = [0x5e, 0xc1, 0x07, 0x33];

/// NDEF detection of a formatted tag holding `current_size` bytes.
pub fn ndef_ready(current_size: u32) -> NdefDetectResult {
    NdefDetectResult {
        status: NfcStatus::Ok,
        mode: NdefMode::ReadWrite,
        current_size,
        max_size: 137,
        is_capable: true,
    }
}

/// NDEF capable tag that has never been formatted.
pub fn ndef_unformatted() -> NdefDetectResult {
    NdefDetectResult {
        status: NfcStatus::Failed,
        mode: NdefMode::Unknown,
        current_size: 0,
        max_size: 0,
        is_capable: true,
    }
}

/// Smart poster style record "https://example.org".
pub fn uri_record() -> Vec<u8> {
    hex::decode("D1010C55046578616D706C652E6F7267").unwrap()
}

/// The two notifications of a Mifare Classic + ISO-DEP part reported as
/// discovery ids 1 and 2.
pub fn sak28_round() -> Vec<HardwareEvent> {
    vec![
        HardwareEvent::Discovery(discovery(
            1,
            Protocol::IsoDep,
            poll_a([0x04, 0x00], &SAK28_UID, 0x28),
            true,
        )),
        HardwareEvent::Discovery(discovery(
            2,
            Protocol::Mifare,
            poll_a([0x04, 0x00], &SAK28_UID, 0x28),
            false,
        )),
    ]
}

pub fn notification_for(
    id: u32,
    protocol: Protocol,
    uid: &[u8],
    sak: u8,
    more: bool,
) -> DiscoveryNotification {
    discovery(id, protocol, poll_a([0x04, 0x00], uid, sak), more)
}
