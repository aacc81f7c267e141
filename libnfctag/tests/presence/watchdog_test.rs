#[path = "../common/mod.rs"]
mod common;

use std::thread;
use std::time::Duration;

use common::fixtures::{ISO_UID, UL_UID, ndef_ready};
use common::helpers::{connected, engine, eventually, listen};
use libnfctag::test_support::{iso_dep_a_activation, t2t_activation};
use libnfctag::transport::{ActivationNotification, Command, HardwareEvent, Reply};
use libnfctag::types::{ConnectionState, DataStatus, DiscoveryId};
use libnfctag::Error;
use serial_test::serial;

fn is_presence_check(c: &Command) -> bool {
    *c == Command::PresenceCheck
}

#[test]
#[serial]
fn checks_never_overlap_with_transceive() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));
    mock.set_responder(|c| {
        matches!(c, Command::RawFrame(_)).then(|| {
            Reply::after(
                Duration::from_millis(30),
                vec![HardwareEvent::Data {
                    status: DataStatus::Final,
                    bytes: vec![0x90, 0x00],
                }],
            )
        })
    });
    engine.start_field_on_checking(5).unwrap();

    for _ in 0..15 {
        assert_eq!(engine.transceive("00B0000000").unwrap(), "9000");
        thread::sleep(Duration::from_millis(10));
    }
    assert!(eventually(|| mock.count(is_presence_check) > 0));
    assert_eq!(mock.overlaps(), 0);
    engine.stop_field_checking();
}

#[test]
#[serial]
fn lost_tag_is_reported_once() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    engine.start_field_on_checking(20).unwrap();
    assert!(engine.is_tag_field_on());
    assert!(engine.is_field_checking());

    mock.set_present(false);
    assert!(eventually(|| !listener.lost().is_empty()));
    assert!(eventually(|| !engine.is_field_checking()));
    assert_eq!(listener.lost(), vec![DiscoveryId::new(1)]);
    assert!(!engine.is_tag_field_on());
    assert!(engine.connected_tag().is_none());
    assert_eq!(engine.connection_state(), ConnectionState::Idle);
    assert!(mock.sent().contains(&Command::Deactivate { to_sleep: false }));
    assert_eq!(engine.transceive("3000"), Err(Error::NotActive));
}

#[test]
#[serial]
fn unanswered_check_counts_as_lost() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_responder(|c| (*c == Command::PresenceCheck).then(Reply::none));
    engine.start_field_on_checking(20).unwrap();

    assert!(eventually(|| listener.lost() == vec![DiscoveryId::new(1)]));
}

#[test]
#[serial]
fn pause_guard_holds_checks_back() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    engine.start_field_on_checking(20).unwrap();

    let guard = engine.pause_field_checking();
    mock.clear_sent();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(mock.count(is_presence_check), 0);

    drop(guard);
    assert!(eventually(|| mock.count(is_presence_check) > 0));
    engine.stop_field_checking();
}

#[test]
#[serial]
fn stop_ends_polling() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    engine.start_field_on_checking(20).unwrap();
    assert!(eventually(|| mock.count(is_presence_check) > 0));

    engine.stop_field_checking();
    assert!(!engine.is_field_checking());
    mock.clear_sent();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(mock.count(is_presence_check), 0);
    assert!(engine.connected_tag().is_some());
}

#[test]
#[serial]
fn checking_needs_an_active_tag() {
    let (engine, _mock) = engine();
    assert_eq!(engine.start_field_on_checking(0), Err(Error::NotActive));
    assert!(!engine.is_field_checking());
}

#[test]
#[serial]
fn checking_survives_a_slow_reselect() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    let template = iso_dep_a_activation(1, &ISO_UID);
    connected(&engine, &mock, template.clone());
    mock.set_responder(move |c| match c {
        Command::Select {
            protocol,
            interface,
            ..
        } => Some(Reply::after(
            Duration::from_millis(60),
            vec![HardwareEvent::Activated(ActivationNotification {
                protocol: *protocol,
                interface: *interface,
                ..template.clone()
            })],
        )),
        _ => None,
    });
    engine.start_field_on_checking(5).unwrap();

    engine.connect(1).unwrap();
    assert!(engine.is_field_checking());
    mock.clear_sent();
    assert!(eventually(|| mock.count(is_presence_check) > 0));

    mock.set_present(false);
    assert!(eventually(|| listener.lost() == vec![DiscoveryId::new(1)]));
    assert!(!engine.is_tag_field_on());
    assert!(engine.connected_tag().is_none());
}

#[test]
#[serial]
fn checking_survives_an_ndef_read_timeout() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.set_ndef_detect(ndef_ready(30));
    engine.detect_ndef_info().unwrap();
    mock.set_responder(|c| matches!(c, Command::ReadNdef { .. }).then(Reply::none));
    engine.start_field_on_checking(5).unwrap();

    assert!(engine.read_ndef().is_err());
    assert_eq!(engine.connection_state(), ConnectionState::Inactive);
    assert!(engine.is_field_checking());

    mock.set_present(false);
    assert!(eventually(|| listener.lost() == vec![DiscoveryId::new(1)]));
    assert!(eventually(|| !engine.is_field_checking()));
}
