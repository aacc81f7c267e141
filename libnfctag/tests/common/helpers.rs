// helpers.rs: engine setup shared by the integration tests

use std::sync::Arc;
use std::time::Duration;

use libnfctag::engine::{EngineConfig, TagEngine};
use libnfctag::tag::TagRecord;
use libnfctag::test_support::{self, RecordingListener};
use libnfctag::transport::{ActivationNotification, MockChannel};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn engine() -> (TagEngine, Arc<MockChannel>) {
    init_logging();
    test_support::engine_with_mock().unwrap()
}

pub fn engine_with(config: EngineConfig) -> (TagEngine, Arc<MockChannel>) {
    init_logging();
    test_support::engine_with_config(config).unwrap()
}

pub fn listen(engine: &TagEngine) -> Arc<RecordingListener> {
    let listener = Arc::new(RecordingListener::default());
    engine.set_listener(Some(listener.clone()));
    listener
}

/// Discover `activation` and forget the commands this took.
pub fn connected(
    engine: &TagEngine,
    mock: &MockChannel,
    activation: ActivationNotification,
) -> TagRecord {
    let record = test_support::discover(engine, mock, activation).expect("tag discovered");
    mock.clear_sent();
    record
}

pub fn eventually<F: Fn() -> bool>(cond: F) -> bool {
    test_support::wait_until(Duration::from_secs(2), cond)
}
