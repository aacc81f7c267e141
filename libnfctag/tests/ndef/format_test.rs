#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{ISO_UID, UL_UID};
use common::helpers::{connected, engine};
use libnfctag::test_support::{
    activation, desfire_activation, felica_activation, iso_dep_a_activation, mifare_activation,
    poll_a, t2t_activation,
};
use libnfctag::transport::Command;
use libnfctag::types::{NfcStatus, Protocol};
use libnfctag::Error;

#[test]
fn format_passes_key_through() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    connected(&engine, &mock, mifare_activation(1, &ISO_UID));
    engine.format_ndef("FFFFFFFFFFFF")?;
    assert_eq!(mock.sent(), vec![Command::Format(vec![0xff; 6])]);
    Ok(())
}

#[test]
fn failed_format_is_reported() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_format_status(NfcStatus::Failed);
    assert_eq!(engine.format_ndef(""), Err(Error::FormatFailed));
}

#[test]
fn rejected_hard_lock_falls_back_to_soft_lock() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.push_read_only_status(NfcStatus::Rejected);

    engine.set_ndef_read_only()?;
    assert_eq!(
        mock.sent(),
        vec![
            Command::SetReadOnly { hard_lock: true },
            Command::SetReadOnly { hard_lock: false },
        ]
    );
    Ok(())
}

#[test]
fn read_only_failure_carries_status() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.push_read_only_status(NfcStatus::Rejected);
    mock.push_read_only_status(NfcStatus::Failed);
    assert_eq!(
        engine.set_ndef_read_only(),
        Err(Error::ReadOnlyFailed(NfcStatus::Failed))
    );
}

#[test]
fn ultralight_is_formattable() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    assert_eq!(engine.is_ndef_formattable(), Ok(true));
}

#[test]
fn plain_type2_is_not_formattable() {
    let (engine, mock) = engine();
    let uid = [0x1d, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77];
    connected(
        &engine,
        &mock,
        activation(1, Protocol::T2t, poll_a([0x44, 0x00], &uid, 0x00), Vec::new()),
    );
    assert_eq!(engine.is_ndef_formattable(), Ok(false));
}

#[test]
fn felica_lite_is_formattable_by_system_code() {
    let (engine, mock) = engine();
    connected(&engine, &mock, felica_activation(1, 0x88b4));
    assert_eq!(engine.is_ndef_formattable(), Ok(true));

    let (engine, mock) = common::helpers::engine();
    connected(&engine, &mock, felica_activation(1, 0x12fc));
    assert_eq!(engine.is_ndef_formattable(), Ok(false));
}

#[test]
fn mifare_classic_is_formattable() {
    let (engine, mock) = engine();
    connected(&engine, &mock, mifare_activation(1, &ISO_UID));
    assert_eq!(engine.is_ndef_formattable(), Ok(true));
    assert!(mock.sent().is_empty());
}

#[test]
fn desfire_is_confirmed_with_get_version() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    connected(&engine, &mock, desfire_activation(1, &UL_UID));
    mock.push_frame_reply(vec![0x04, 0x01, 0x01, 0x01, 0x00, 0x1a, 0x05, 0x91, 0xaf]);

    assert_eq!(engine.is_ndef_formattable(), Ok(true));
    assert_eq!(
        mock.sent(),
        vec![Command::RawFrame(vec![0x90, 0x60, 0x00, 0x00, 0x00])]
    );
    Ok(())
}

#[test]
fn desfire_lookalike_without_version_is_not_formattable() {
    let (engine, mock) = engine();
    connected(&engine, &mock, desfire_activation(1, &UL_UID));
    mock.push_frame_reply(vec![0x6d, 0x00]);
    assert_eq!(engine.is_ndef_formattable(), Ok(false));
}

#[test]
fn other_iso_dep_tags_skip_get_version() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));
    assert_eq!(engine.is_ndef_formattable(), Ok(false));
    assert!(mock.sent().is_empty());
}
