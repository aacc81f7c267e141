// libnfctag/src/transport/mock.rs

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, trace};

use crate::transport::command::Command;
use crate::transport::events::{ActivationNotification, EventSink, HardwareEvent, NdefDetectResult};
use crate::transport::traits::HardwareChannel;
use crate::types::{DataStatus, DeactivationKind, DiscoveryId, NdefMode, NfcStatus, Protocol, RfInterface};
use crate::utils::sync::{lock, read, write};
use crate::{Error, Result};

/// Events answering one command, delivered after `delay` on the mock
/// callback thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Delay before the first event
    pub delay: Duration,
    /// Events in delivery order; empty means no answer
    pub events: Vec<HardwareEvent>,
}

impl Reply {
    /// Answer without delay.
    pub fn now(events: Vec<HardwareEvent>) -> Self {
        Self {
            delay: Duration::ZERO,
            events,
        }
    }

    /// Answer after `delay`.
    pub fn after(delay: Duration, events: Vec<HardwareEvent>) -> Self {
        Self { delay, events }
    }

    /// The command is accepted but the controller never answers.
    pub fn none() -> Self {
        Self::default()
    }
}

type Responder = Arc<dyn Fn(&Command) -> Option<Reply> + Send + Sync>;

struct Delivery {
    at: Instant,
    events: Vec<HardwareEvent>,
    tracked: bool,
}

struct MockState {
    sent: Vec<Command>,
    targets: Vec<ActivationNotification>,
    present: bool,
    frame_replies: VecDeque<Vec<HardwareEvent>>,
    ndef_detect: NdefDetectResult,
    ndef_message: Vec<u8>,
    format_status: NfcStatus,
    read_only_statuses: VecDeque<NfcStatus>,
    refused: HashSet<&'static str>,
    responder: Option<Responder>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            sent: Vec::new(),
            targets: Vec::new(),
            present: true,
            frame_replies: VecDeque::new(),
            ndef_detect: NdefDetectResult::default(),
            ndef_message: Vec::new(),
            format_status: NfcStatus::Ok,
            read_only_statuses: VecDeque::new(),
            refused: HashSet::new(),
            responder: None,
        }
    }
}

struct Shared {
    sink: RwLock<Option<Weak<dyn EventSink>>>,
    state: Mutex<MockState>,
    in_flight: AtomicUsize,
    overlaps: AtomicUsize,
}

impl Shared {
    fn deliver(&self, event: HardwareEvent) {
        let sink = read(&self.sink).as_ref().and_then(Weak::upgrade);
        match sink {
            Some(sink) => sink.on_event(event),
            None => trace!("mock: no sink for {:?}", event),
        }
    }
}

/// In-process stand-in for the vendor controller library.
///
/// Records every [`Command`] and answers it like a cooperative controller
/// holding the placed targets. Answers are delivered on a dedicated thread,
/// as the real library does from its callback thread. Tests may override any
/// answer with [`set_responder`](Self::set_responder).
pub struct MockChannel {
    shared: Arc<Shared>,
    tx: Sender<Delivery>,
}

impl std::fmt::Debug for MockChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockChannel")
            .field("sent", &lock(&self.shared.state).sent.len())
            .field("overlaps", &self.overlaps())
            .finish()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChannel {
    /// Mock with no targets and a present tag. Spawns the delivery thread.
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            sink: RwLock::new(None),
            state: Mutex::new(MockState::default()),
            in_flight: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
        });
        let (tx, rx) = unbounded();
        let worker = Arc::clone(&shared);
        // The thread ends once every sender, i.e. the mock itself, is gone.
        let spawned = thread::Builder::new()
            .name("mock-nfc-events".into())
            .spawn(move || delivery_loop(worker, rx));
        if let Err(e) = spawned {
            log::error!("mock: cannot spawn delivery thread: {}", e);
        }
        Self { shared, tx }
    }

    /// Make a target available to select and discovery restarts.
    pub fn place_target(&self, activation: ActivationNotification) {
        let mut st = lock(&self.shared.state);
        st.targets.retain(|t| t.discovery_id != activation.discovery_id);
        st.targets.push(activation);
    }

    /// Forget every target; selects and discovery restarts then fail.
    pub fn remove_targets(&self) {
        lock(&self.shared.state).targets.clear();
    }

    /// Answer of future presence checks.
    pub fn set_present(&self, present: bool) {
        lock(&self.shared.state).present = present;
    }

    /// Queue the answer to the next raw or Mifare frame.
    pub fn push_frame_reply(&self, bytes: Vec<u8>) {
        self.push_frame_events(vec![HardwareEvent::Data {
            status: DataStatus::Final,
            bytes,
        }]);
    }

    /// Queue an answer split over several data chunks.
    pub fn push_chunked_reply(&self, chunks: Vec<Vec<u8>>) {
        let last = chunks.len().saturating_sub(1);
        let events = chunks
            .into_iter()
            .enumerate()
            .map(|(i, bytes)| HardwareEvent::Data {
                status: if i == last {
                    DataStatus::Final
                } else {
                    DataStatus::Continue
                },
                bytes,
            })
            .collect();
        self.push_frame_events(events);
    }

    /// Queue arbitrary events answering the next frame.
    pub fn push_frame_events(&self, events: Vec<HardwareEvent>) {
        lock(&self.shared.state).frame_replies.push_back(events);
    }

    /// Answer of future NDEF detections.
    pub fn set_ndef_detect(&self, result: NdefDetectResult) {
        lock(&self.shared.state).ndef_detect = result;
    }

    /// Message returned by future NDEF reads.
    pub fn set_ndef_message(&self, message: Vec<u8>) {
        lock(&self.shared.state).ndef_message = message;
    }

    /// Last message stored by a write.
    pub fn ndef_message(&self) -> Vec<u8> {
        lock(&self.shared.state).ndef_message.clone()
    }

    /// Status answered to future format requests.
    pub fn set_format_status(&self, status: NfcStatus) {
        lock(&self.shared.state).format_status = status;
    }

    /// Status answered to the next read-only request; `Ok` once exhausted.
    pub fn push_read_only_status(&self, status: NfcStatus) {
        lock(&self.shared.state).read_only_statuses.push_back(status);
    }

    /// Make commands named `name` (see [`Command::name`]) fail immediately.
    pub fn refuse(&self, name: &'static str) {
        lock(&self.shared.state).refused.insert(name);
    }

    /// Override the built-in answers. Returning `None` falls back to them.
    pub fn set_responder<F>(&self, responder: F)
    where
        F: Fn(&Command) -> Option<Reply> + Send + Sync + 'static,
    {
        lock(&self.shared.state).responder = Some(Arc::new(responder));
    }

    /// Back to the built-in answers.
    pub fn clear_responder(&self) {
        lock(&self.shared.state).responder = None;
    }

    /// Deliver unsolicited events, e.g. discovery notifications.
    pub fn inject(&self, events: Vec<HardwareEvent>) {
        self.inject_after(Duration::ZERO, events);
    }

    /// Like [`inject`](Self::inject), after `delay`.
    pub fn inject_after(&self, delay: Duration, events: Vec<HardwareEvent>) {
        self.enqueue(delay, events, false);
    }

    /// Every command issued so far, in order.
    pub fn sent(&self) -> Vec<Command> {
        lock(&self.shared.state).sent.clone()
    }

    /// Forget recorded commands.
    pub fn clear_sent(&self) {
        lock(&self.shared.state).sent.clear();
    }

    /// Number of recorded commands matching `pred`.
    pub fn count<P>(&self, pred: P) -> usize
    where
        P: Fn(&Command) -> bool,
    {
        lock(&self.shared.state).sent.iter().filter(|c| pred(c)).count()
    }

    /// Commands issued while another answered command was still pending.
    pub fn overlaps(&self) -> usize {
        self.shared.overlaps.load(Ordering::SeqCst)
    }

    fn enqueue(&self, delay: Duration, events: Vec<HardwareEvent>, tracked: bool) {
        let delivery = Delivery {
            at: Instant::now() + delay,
            events,
            tracked,
        };
        if self.tx.send(delivery).is_err() {
            debug!("mock: delivery thread gone");
        }
    }

    fn issue(&self, command: Command) -> Result<()> {
        debug!("mock: {:?}", command);
        let responder = {
            let mut st = lock(&self.shared.state);
            st.sent.push(command.clone());
            if st.refused.contains(command.name()) {
                return Err(Error::Hardware(NfcStatus::Rejected));
            }
            st.responder.clone()
        };

        let reply = match responder.and_then(|r| r(&command)) {
            Some(reply) => reply,
            None => simulate(&command, &mut lock(&self.shared.state)),
        };
        if reply.events.is_empty() {
            return Ok(());
        }

        if self.shared.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.shared.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.enqueue(reply.delay, reply.events, true);
        Ok(())
    }
}

fn delivery_loop(shared: Arc<Shared>, rx: Receiver<Delivery>) {
    while let Ok(delivery) = rx.recv() {
        let now = Instant::now();
        if delivery.at > now {
            thread::sleep(delivery.at - now);
        }
        let count = delivery.events.len();
        for (i, event) in delivery.events.into_iter().enumerate() {
            if delivery.tracked && i + 1 == count {
                shared.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            shared.deliver(event);
        }
    }
}

fn activation_for(
    st: &MockState,
    id: DiscoveryId,
    protocol: Protocol,
    interface: RfInterface,
) -> Option<ActivationNotification> {
    st.targets
        .iter()
        .find(|t| t.discovery_id == id)
        .map(|t| ActivationNotification {
            protocol,
            interface,
            ..t.clone()
        })
}

/// Answers of a controller that does what it is asked.
fn simulate(command: &Command, st: &mut MockState) -> Reply {
    match command {
        Command::RawFrame(_) | Command::MifareFrame(_) => match st.frame_replies.pop_front() {
            Some(events) => Reply::now(events),
            None => Reply::none(),
        },
        Command::Deactivate { to_sleep } => {
            let kind = if *to_sleep {
                DeactivationKind::Sleep
            } else {
                DeactivationKind::Idle
            };
            Reply::now(vec![HardwareEvent::Deactivated(kind)])
        }
        Command::Select {
            id,
            protocol,
            interface,
        } => match activation_for(st, *id, *protocol, *interface) {
            Some(activation) => Reply::now(vec![HardwareEvent::Activated(activation)]),
            None => Reply::now(vec![HardwareEvent::SelectResult(NfcStatus::Failed)]),
        },
        Command::RfDiscovery { start: false } => Reply::now(vec![
            HardwareEvent::RfDiscovery {
                started: false,
                status: NfcStatus::Ok,
            },
            HardwareEvent::Deactivated(DeactivationKind::Idle),
        ]),
        Command::RfDiscovery { start: true } => {
            let mut events = vec![HardwareEvent::RfDiscovery {
                started: true,
                status: NfcStatus::Ok,
            }];
            if let Some(first) = st.targets.first() {
                events.push(HardwareEvent::Activated(first.clone()));
            }
            Reply::now(events)
        }
        Command::PresenceCheck => Reply::now(vec![HardwareEvent::PresenceCheck {
            present: st.present,
        }]),
        Command::DetectNdef => Reply::now(vec![HardwareEvent::NdefDetected(st.ndef_detect)]),
        Command::ReadNdef { .. } => Reply::now(vec![HardwareEvent::NdefRead {
            status: NfcStatus::Ok,
            data: st.ndef_message.clone(),
        }]),
        Command::WriteNdef(message) => {
            st.ndef_message = message.clone();
            Reply::now(vec![HardwareEvent::NdefWritten(NfcStatus::Ok)])
        }
        Command::Format(_) => {
            let status = st.format_status;
            if status.is_ok() {
                st.ndef_detect = NdefDetectResult {
                    status: NfcStatus::Ok,
                    mode: NdefMode::ReadWrite,
                    current_size: 0,
                    ..st.ndef_detect
                };
            }
            Reply::now(vec![HardwareEvent::Formatted(status)])
        }
        Command::SetReadOnly { .. } => {
            let status = st.read_only_statuses.pop_front().unwrap_or(NfcStatus::Ok);
            Reply::now(vec![HardwareEvent::ReadOnly(status)])
        }
    }
}

impl HardwareChannel for MockChannel {
    fn register_sink(&self, sink: Weak<dyn EventSink>) {
        *write(&self.shared.sink) = Some(sink);
    }

    fn send_raw_frame(&self, data: &[u8]) -> Result<()> {
        self.issue(Command::RawFrame(data.to_vec()))
    }

    fn send_mifare_frame(&self, data: &[u8]) -> Result<()> {
        self.issue(Command::MifareFrame(data.to_vec()))
    }

    fn deactivate(&self, to_sleep: bool) -> Result<()> {
        self.issue(Command::Deactivate { to_sleep })
    }

    fn select(&self, id: DiscoveryId, protocol: Protocol, interface: RfInterface) -> Result<()> {
        self.issue(Command::Select {
            id,
            protocol,
            interface,
        })
    }

    fn start_rf_discovery(&self, start: bool) -> Result<()> {
        self.issue(Command::RfDiscovery { start })
    }

    fn presence_check(&self) -> Result<()> {
        self.issue(Command::PresenceCheck)
    }

    fn detect_ndef(&self) -> Result<()> {
        self.issue(Command::DetectNdef)
    }

    fn read_ndef(&self) -> Result<()> {
        self.issue(Command::ReadNdef { mifare: false })
    }

    fn read_mifare_ndef(&self) -> Result<()> {
        self.issue(Command::ReadNdef { mifare: true })
    }

    fn write_ndef(&self, message: &[u8]) -> Result<()> {
        self.issue(Command::WriteNdef(message.to_vec()))
    }

    fn format_tag(&self, key: &[u8]) -> Result<()> {
        self.issue(Command::Format(key.to_vec()))
    }

    fn set_tag_read_only(&self, hard_lock: bool) -> Result<()> {
        self.issue(Command::SetReadOnly { hard_lock })
    }
}
