#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{UL_UID, ndef_ready, ndef_unformatted, uri_record};
use common::helpers::{connected, engine, eventually};
use libnfctag::engine::NdefDetection;
use libnfctag::test_support::t2t_activation;
use libnfctag::transport::{Command, HardwareEvent, Reply};
use libnfctag::types::{ConnectionState, NdefMode};
use libnfctag::utils::bytes_to_hex;
use libnfctag::Error;

#[test]
fn detect_reports_capacity_and_mode() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_ndef_detect(ndef_ready(20));

    let info = engine.detect_ndef_info()?;
    assert_eq!(
        info,
        NdefDetection {
            is_ndef: true,
            max_size: 137,
            mode: NdefMode::ReadWrite,
        }
    );
    assert_eq!(engine.ndef_cache().current_size, 20);
    assert_eq!(mock.sent(), vec![Command::DetectNdef]);
    Ok(())
}

#[test]
fn read_returns_stored_message_as_hex() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_ndef_detect(ndef_ready(uri_record().len() as u32));
    mock.set_ndef_message(uri_record());

    engine.detect_ndef_info()?;
    assert_eq!(engine.read_ndef()?, bytes_to_hex(&uri_record()));
    Ok(())
}

#[test]
fn read_without_content_sends_nothing() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_ndef_detect(ndef_ready(0));
    engine.detect_ndef_info()?;
    mock.clear_sent();

    assert_eq!(engine.read_ndef()?, "");
    assert!(mock.sent().is_empty());
    Ok(())
}

#[test]
fn empty_write_stores_an_empty_record() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_ndef_detect(ndef_ready(16));
    engine.detect_ndef_info()?;
    mock.clear_sent();

    engine.write_ndef("")?;
    assert_eq!(mock.sent(), vec![Command::WriteNdef(vec![0xd0, 0x00, 0x00])]);
    assert_eq!(mock.ndef_message(), vec![0xd0, 0x00, 0x00]);
    Ok(())
}

#[test]
fn write_formats_an_unformatted_tag_first() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_ndef_detect(ndef_unformatted());
    assert!(!engine.detect_ndef_info()?.is_ndef);
    mock.clear_sent();

    engine.write_ndef("D1010C55046578616D706C652E6F7267")?;
    assert_eq!(
        mock.sent(),
        vec![Command::Format(Vec::new()), Command::WriteNdef(uri_record())]
    );
    Ok(())
}

#[test]
fn rejected_write_is_a_hardware_error() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_ndef_detect(ndef_ready(16));
    engine.detect_ndef_info().unwrap();
    mock.set_responder(|c| {
        matches!(c, Command::WriteNdef(_)).then(|| {
            Reply::now(vec![HardwareEvent::NdefWritten(
                libnfctag::NfcStatus::Rejected,
            )])
        })
    });

    assert_eq!(
        engine.write_ndef("D00000"),
        Err(Error::Hardware(libnfctag::NfcStatus::Rejected))
    );
}

#[test]
fn read_timeout_blocks_reselect_until_next_activation() -> anyhow::Result<()> {
    let (engine, mock) = engine();
    let activation = t2t_activation(1, &UL_UID);
    connected(&engine, &mock, activation.clone());
    mock.set_ndef_detect(ndef_ready(30));
    engine.detect_ndef_info()?;
    mock.set_responder(|c| matches!(c, Command::ReadNdef { .. }).then(Reply::none));

    assert_eq!(
        engine.read_ndef(),
        Err(Error::Timeout {
            operation: "ndef read"
        })
    );
    assert_eq!(engine.connection_state(), ConnectionState::Inactive);
    assert!(matches!(engine.reconnect(), Err(Error::Busy(_))));
    assert!(matches!(engine.transceive("3000"), Err(Error::Busy(_))));

    mock.clear_responder();
    mock.inject(vec![HardwareEvent::Activated(activation)]);
    assert!(eventually(|| engine.connection_state() == ConnectionState::Active));
    mock.clear_sent();
    engine.reconnect()?;
    assert_eq!(mock.count(Command::is_select), 1);
    Ok(())
}

#[test]
fn ndef_calls_need_an_active_tag() {
    let (engine, _mock) = engine();
    assert_eq!(engine.detect_ndef_info(), Err(Error::NotActive));
    assert_eq!(engine.read_ndef(), Err(Error::NotActive));
    assert_eq!(engine.write_ndef("D00000"), Err(Error::NotActive));
}
