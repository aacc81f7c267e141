#[path = "../common/mod.rs"]
mod common;

use common::fixtures::ISO_UID;
use common::helpers::{connected, engine};
use libnfctag::engine::{DEFAULT_TIMEOUT_MS, default_timeout_ms};
use libnfctag::test_support::{activation, poll_a};
use libnfctag::types::{Protocol, Technology};

#[test]
fn reset_restores_documented_defaults() {
    let (engine, _mock) = engine();
    for tech in Technology::ALL {
        engine.set_timeout(tech.code(), 7);
    }
    engine.reset_timeout();
    for tech in Technology::ALL {
        assert_eq!(engine.get_timeout(tech.code()), default_timeout_ms(tech));
    }
    assert_eq!(engine.get_timeout(Technology::NfcF.code()), 255);
}

#[test]
fn out_of_range_codes_are_ignored() {
    let (engine, _mock) = engine();
    engine.set_timeout(0, 1);
    engine.set_timeout(11, 1);
    assert_eq!(engine.get_timeout(0), DEFAULT_TIMEOUT_MS);
    assert_eq!(engine.get_timeout(11), DEFAULT_TIMEOUT_MS);
    for tech in Technology::ALL {
        assert_eq!(engine.get_timeout(tech.code()), default_timeout_ms(tech));
    }
}

#[test]
fn iso_dep_activation_tunes_timeout_from_fwi() {
    let (engine, mock) = engine();
    // T0 = 0x78: TA, TB, TC present; TB = 0x70 -> FWI 7
    let ats = vec![0x78, 0x80, 0x70, 0x02, 0xc1];
    connected(
        &engine,
        &mock,
        activation(1, Protocol::IsoDep, poll_a([0x04, 0x00], &ISO_UID, 0x20), ats),
    );
    assert_eq!(engine.get_timeout(Technology::IsoDep.code()), 80);

    engine.reset_timeout();
    assert_eq!(engine.get_timeout(Technology::IsoDep.code()), 618);
}
