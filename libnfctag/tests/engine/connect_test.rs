#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{ISO_UID, UL_UID, notification_for};
use common::helpers::{connected, engine, eventually, listen};
use libnfctag::engine::NdefDetection;
use libnfctag::test_support::{
    cashbee_activation, iso_dep_a_activation, mifare_activation, t2t_activation,
};
use libnfctag::transport::{Command, HardwareEvent, Reply};
use libnfctag::types::{
    ConnectionState, DiscoveryId, NdefMode, NfcStatus, Protocol, RfInterface, Technology,
};
use libnfctag::Error;

#[test]
fn discovered_iso_dep_tag_is_connected_on_iso_dep() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    let record = connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));

    assert_eq!(record.technologies(), &[Technology::IsoDep, Technology::NfcA]);
    assert_eq!(record.connected_tech_index(), Some(0));
    assert_eq!(engine.connection_state(), ConnectionState::Active);
    assert_eq!(listener.discovered(), vec![DiscoveryId::new(1)]);
}

#[test]
fn connect_switches_interface_with_one_handshake() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));

    engine.connect(1).unwrap();
    assert_eq!(
        mock.sent(),
        vec![
            Command::Deactivate { to_sleep: true },
            Command::Select {
                id: DiscoveryId::new(1),
                protocol: Protocol::IsoDep,
                interface: RfInterface::Frame,
            },
        ]
    );
    assert_eq!(engine.connected_tag().unwrap().connected_tech_index(), Some(1));
}

#[test]
fn connect_to_current_interface_is_a_noop() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));

    engine.connect(1).unwrap();
    let after_first = mock.sent().len();
    engine.connect(1).unwrap();
    engine.connect(1).unwrap();
    assert_eq!(mock.sent().len(), after_first);
}

#[test]
fn at_most_one_record_is_connected() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));
    for index in [1, 0, 1] {
        engine.connect(index).unwrap();
        let connected: Vec<_> = engine
            .tags()
            .into_iter()
            .filter(|t| t.connected_tech_index().is_some())
            .collect();
        assert_eq!(connected.len(), 1);
        assert_eq!(connected[0].connected_tech_index(), Some(index));
        assert_eq!(engine.connection_state(), ConnectionState::Active);
    }
}

#[test]
fn reselect_gives_up_after_three_retries() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));
    mock.set_responder(|c| c.is_select().then(Reply::none));

    let err = engine.connect(1).unwrap_err();
    assert_eq!(err, Error::ReselectFailed(RfInterface::Frame));
    assert_eq!(mock.count(Command::is_select), 4);
    assert_eq!(engine.connection_state(), ConnectionState::Sleep);
}

#[test]
fn invalid_tech_index_is_rejected() {
    let (engine, mock) = engine();
    connected(&engine, &mock, iso_dep_a_activation(1, &ISO_UID));
    assert_eq!(
        engine.connect(5),
        Err(Error::InvalidTechIndex { index: 5, count: 2 })
    );
    assert!(mock.sent().is_empty());
}

#[test]
fn connect_without_tag_fails() {
    let (engine, _mock) = engine();
    assert_eq!(engine.connect(0), Err(Error::NotActive));
    assert_eq!(engine.reconnect(), Err(Error::NotActive));
}

#[test]
fn reconnect_on_frame_interface_halts_first() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));

    engine.reconnect().unwrap();
    let sent = mock.sent();
    assert_eq!(sent[0], Command::RawFrame(vec![0x50, 0x00]));
    assert_eq!(sent[1], Command::Deactivate { to_sleep: true });
    assert!(sent[2].is_select());
}

#[test]
fn cashbee_restarts_discovery_instead_of_sleeping() {
    let (engine, mock) = engine();
    connected(&engine, &mock, cashbee_activation(1, &ISO_UID));

    engine.connect(1).unwrap();
    assert_eq!(
        mock.sent(),
        vec![
            Command::RfDiscovery { start: false },
            Command::RfDiscovery { start: true },
        ]
    );
    assert_eq!(engine.connection_state(), ConnectionState::Active);
}

#[test]
fn disconnect_always_succeeds_and_reports_loss_once() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    connected(&engine, &mock, t2t_activation(1, &UL_UID));

    assert_eq!(engine.disconnect(), Ok(true));
    assert_eq!(engine.disconnect(), Ok(true));
    assert!(mock.sent().contains(&Command::Deactivate { to_sleep: false }));
    assert!(engine.tags().is_empty());
    assert_eq!(engine.connection_state(), ConnectionState::Idle);
    assert_eq!(listener.lost(), vec![DiscoveryId::new(1)]);
}

#[test]
fn disconnect_survives_refused_deactivate() {
    let (engine, mock) = engine();
    connected(&engine, &mock, t2t_activation(1, &UL_UID));
    mock.refuse("deactivate");
    assert_eq!(engine.disconnect(), Ok(true));
    assert!(engine.connected_tag().is_none());
}

#[test]
fn refused_mifare_interface_falls_back_to_iso_dep() {
    let (engine, mock) = engine();
    mock.place_target(iso_dep_a_activation(1, &ISO_UID));
    mock.place_target(mifare_activation(3, &ISO_UID));
    mock.inject(vec![
        HardwareEvent::Discovery(notification_for(1, Protocol::IsoDep, &ISO_UID, 0x20, true)),
        HardwareEvent::Discovery(notification_for(3, Protocol::Mifare, &ISO_UID, 0x08, false)),
    ]);
    assert!(eventually(|| engine.connected_tag().is_some()));
    engine.connect(0).unwrap();

    mock.set_responder(|c| match c {
        Command::Select {
            protocol: Protocol::Mifare,
            ..
        } => Some(Reply::now(vec![HardwareEvent::SelectResult(NfcStatus::Failed)])),
        _ => None,
    });
    mock.clear_sent();

    engine.connect(2).unwrap();
    let mifare_selects = mock.count(|c| {
        matches!(
            c,
            Command::Select {
                protocol: Protocol::Mifare,
                ..
            }
        )
    });
    assert_eq!(mifare_selects, 1);
    assert_eq!(
        mock.sent().last(),
        Some(&Command::Select {
            id: DiscoveryId::new(1),
            protocol: Protocol::IsoDep,
            interface: RfInterface::IsoDep,
        })
    );
    let quirks = engine.quirks();
    assert!(quirks.multi_proto_mifare && quirks.skip_ndef_read);
    assert_eq!(engine.connection_state(), ConnectionState::Active);
    let record = engine.connected_tag().unwrap();
    assert_eq!(record.connected_tech_index(), Some(0));
    assert_eq!(record.technology(0), Some(Technology::IsoDep));

    mock.clear_sent();
    assert_eq!(
        engine.detect_ndef_info(),
        Ok(NdefDetection {
            is_ndef: false,
            max_size: 0,
            mode: NdefMode::ReadOnly,
        })
    );
    assert!(mock.sent().is_empty());
}
