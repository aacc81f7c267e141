#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{ISO_UID, SAK28_UID, UL_UID, notification_for, sak28_round};
use common::helpers::{engine, eventually, listen};
use libnfctag::test_support::{iso_dep_a_activation, mifare_activation, t2t_activation};
use libnfctag::transport::{Command, HardwareEvent};
use libnfctag::types::{
    ConnectionState, DiscoveryId, Protocol, RfInterface, Technology,
};

#[test]
fn sak28_tag_is_published_without_a_select() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    mock.inject(sak28_round());

    assert!(eventually(|| engine.connected_tag().is_some()));
    let record = engine.connected_tag().unwrap();
    assert_eq!(
        record.technologies(),
        &[Technology::IsoDep, Technology::NfcA, Technology::MifareClassic]
    );
    assert_eq!(record.uid().as_bytes(), &SAK28_UID);
    assert_eq!(record.handle(2), Some(DiscoveryId::new(2)));
    assert_eq!(record.connected_tech_index(), Some(0));
    assert_eq!(mock.count(Command::is_select), 0);
    assert_eq!(listener.discovered(), vec![DiscoveryId::new(1)]);
}

#[test]
fn multi_protocol_tag_is_walked_before_publishing() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    mock.place_target(iso_dep_a_activation(1, &ISO_UID));
    mock.place_target(mifare_activation(3, &ISO_UID));
    mock.inject(vec![
        HardwareEvent::Discovery(notification_for(1, Protocol::IsoDep, &ISO_UID, 0x20, true)),
        HardwareEvent::Discovery(notification_for(3, Protocol::Mifare, &ISO_UID, 0x08, false)),
    ]);

    assert!(eventually(|| engine.connected_tag().is_some()));
    assert_eq!(
        mock.sent(),
        vec![
            Command::Select {
                id: DiscoveryId::new(1),
                protocol: Protocol::IsoDep,
                interface: RfInterface::IsoDep,
            },
            Command::Deactivate { to_sleep: true },
            Command::Select {
                id: DiscoveryId::new(3),
                protocol: Protocol::Mifare,
                interface: RfInterface::Mifare,
            },
        ]
    );
    let record = engine.connected_tag().unwrap();
    assert_eq!(record.discovery_id(), DiscoveryId::new(1));
    assert_eq!(
        record.technologies(),
        &[Technology::IsoDep, Technology::NfcA, Technology::MifareClassic]
    );
    assert_eq!(record.connected_tech_index(), Some(2));
    assert!(record.is_multi_proto_mifare());
    assert_eq!(listener.discovered(), vec![DiscoveryId::new(1)]);
}

#[test]
fn only_the_first_of_several_tags_is_published() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    mock.place_target(t2t_activation(1, &UL_UID));
    mock.place_target(iso_dep_a_activation(2, &ISO_UID));
    mock.inject(vec![
        HardwareEvent::Discovery(notification_for(1, Protocol::T2t, &UL_UID, 0x00, true)),
        HardwareEvent::Discovery(notification_for(2, Protocol::IsoDep, &ISO_UID, 0x20, false)),
    ]);

    assert!(eventually(|| engine.connected_tag().is_some()));
    assert_eq!(engine.tags().len(), 1);
    assert_eq!(engine.connected_tag().unwrap().uid().as_bytes(), &UL_UID);
    assert_eq!(mock.count(Command::is_select), 1);
    assert_eq!(listener.discovered(), vec![DiscoveryId::new(1)]);
}

#[test]
fn refused_select_releases_the_target() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    mock.refuse("select");
    mock.place_target(t2t_activation(1, &UL_UID));
    mock.inject(vec![HardwareEvent::Discovery(notification_for(
        1,
        Protocol::T2t,
        &UL_UID,
        0x00,
        false,
    ))]);

    assert!(eventually(|| mock
        .sent()
        .contains(&Command::Deactivate { to_sleep: false })));
    assert!(engine.connected_tag().is_none());
    assert!(listener.discovered().is_empty());
    assert!(eventually(|| engine.connection_state() == ConnectionState::Idle));
}

#[test]
fn failed_notifications_are_ignored() {
    let (engine, mock) = engine();
    let mut failed = notification_for(1, Protocol::T2t, &UL_UID, 0x00, false);
    failed.status = libnfctag::NfcStatus::Failed;
    mock.inject(vec![HardwareEvent::Discovery(failed)]);
    mock.inject(vec![HardwareEvent::Discovery(notification_for(
        2,
        Protocol::NfcDep,
        &UL_UID,
        0x40,
        false,
    ))]);

    std::thread::sleep(std::time::Duration::from_millis(100));
    assert!(mock.sent().is_empty());
    assert!(engine.tags().is_empty());
}

#[test]
fn a_new_round_after_loss_publishes_again() {
    let (engine, mock) = engine();
    let listener = listen(&engine);
    mock.place_target(t2t_activation(1, &UL_UID));
    let round = || {
        vec![HardwareEvent::Discovery(notification_for(
            1,
            Protocol::T2t,
            &UL_UID,
            0x00,
            false,
        ))]
    };

    mock.inject(round());
    assert!(eventually(|| engine.connected_tag().is_some()));
    mock.inject(vec![HardwareEvent::Deactivated(
        libnfctag::DeactivationKind::Discovery,
    )]);
    assert!(eventually(|| engine.connected_tag().is_none()));

    mock.inject(round());
    assert!(eventually(|| engine.connected_tag().is_some()));
    assert_eq!(listener.discovered().len(), 2);
    assert_eq!(listener.lost(), vec![DiscoveryId::new(1)]);
}
