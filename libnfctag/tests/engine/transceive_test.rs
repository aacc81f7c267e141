#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{ISO_UID, UL_UID};
use common::helpers::{connected, engine, engine_with};
use libnfctag::test_support::{fast_config, iso_dep_a_activation, mifare_activation, t2t_activation};
use libnfctag::transport::Command;
use libnfctag::types::{DiscoveryId, Protocol, RfInterface, Technology};
use libnfctag::{EngineConfig, Error};

#[test]
fn transceive_round_trip_in_hex() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));
    mock.push_frame_reply(vec![0x6f, 0x10, 0x90, 0x00]);

    let response = engine.transceive("00a4040007d2760000850101").unwrap();
    assert_eq!(response, "6F109000");
    assert_eq!(
        mock.sent(),
        vec![Command::RawFrame(
            hex::decode("00a4040007d2760000850101").unwrap()
        )]
    );
}

#[test]
fn chunks_are_joined_before_returning() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));
    mock.push_chunked_reply(vec![vec![0x01, 0x02], vec![0x03], vec![0x90, 0x00]]);
    assert_eq!(engine.transceive("00B0000000").unwrap(), "0102039000");
}

#[test]
fn t2t_nack_reconnects_silently() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.push_frame_reply(vec![0x00]);

    let response = engine.transceive("3004").unwrap();
    assert_eq!(response, "");
    let sent = mock.sent();
    assert!(sent.contains(&Command::Deactivate { to_sleep: true }));
    assert!(sent.contains(&Command::Select {
        id: DiscoveryId::new(1),
        protocol: Protocol::T2t,
        interface: RfInterface::Frame,
    }));
}

#[test]
fn t2t_ack_is_returned_as_data() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.push_frame_reply(vec![0x0a]);
    assert_eq!(engine.transceive("A2050102030A").unwrap(), "0A");
    assert_eq!(mock.count(Command::is_select), 0);
}

#[test]
fn legacy_mifare_nack_reconnects_and_reports_code() {
    let (engine, mock) = engine_with(EngineConfig {
        legacy_mifare_reader: true,
        ..fast_config()
    });
    connected(&engine, &mock, mifare_activation(1, &ISO_UID));
    mock.push_frame_reply(vec![0x04]);

    assert_eq!(engine.transceive("3004").unwrap(), "04");
    let sent = mock.sent();
    assert_eq!(sent[0], Command::MifareFrame(vec![0x30, 0x04]));
    assert!(sent.contains(&Command::Select {
        id: DiscoveryId::new(1),
        protocol: Protocol::Mifare,
        interface: RfInterface::Mifare,
    }));
}

#[test]
fn unanswered_frame_times_out_with_tech_timeout() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    engine.set_timeout(Technology::NfcA.code(), 30);

    let started = std::time::Instant::now();
    let err = engine.transceive("3000").unwrap_err();
    assert_eq!(
        err,
        Error::Timeout {
            operation: "transceive"
        }
    );
    assert!(started.elapsed() < std::time::Duration::from_millis(500));
}

#[test]
fn malformed_request_is_a_parameter_error() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    assert!(matches!(engine.transceive("30G"), Err(Error::InvalidHex(_))));
    assert!(matches!(
        engine.transceive(""),
        Err(Error::InvalidParameter(_))
    ));
    assert!(mock.sent().is_empty());
}

#[test]
fn transceive_needs_active_tag() {
    let (engine, _mock) = engine();
    assert_eq!(engine.transceive("3000"), Err(Error::NotActive));
}
