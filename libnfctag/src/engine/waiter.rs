// libnfctag/src/engine/waiter.rs

//! One bounded wait per kind of controller answer. The caller arms the
//! waiter, issues its command and blocks; the event thread fills the slot.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::types::{DeactivationKind, NfcStatus};
use crate::utils::sync::lock;
use crate::{Error, Result};

#[derive(Debug)]
struct Slot<T> {
    armed: bool,
    value: Option<T>,
    aborted: bool,
}

#[derive(Debug)]
pub(crate) struct Waiter<T> {
    operation: &'static str,
    slot: Mutex<Slot<T>>,
    cond: Condvar,
}

impl<T> Waiter<T> {
    pub(crate) fn new(operation: &'static str) -> Self {
        Self {
            operation,
            slot: Mutex::new(Slot {
                armed: false,
                value: None,
                aborted: false,
            }),
            cond: Condvar::new(),
        }
    }

    /// Forget any stale answer and start accepting a new one. Must be
    /// called before the command is issued.
    pub(crate) fn arm(&self) {
        let mut slot = lock(&self.slot);
        slot.armed = true;
        slot.value = None;
        slot.aborted = false;
    }

    pub(crate) fn disarm(&self) {
        lock(&self.slot).armed = false;
    }

    pub(crate) fn is_armed(&self) -> bool {
        lock(&self.slot).armed
    }

    /// Deliver an answer. Ignored when nobody is waiting.
    pub(crate) fn notify(&self, value: T) -> bool {
        let mut slot = lock(&self.slot);
        if !slot.armed {
            return false;
        }
        slot.value = Some(value);
        self.cond.notify_all();
        true
    }

    /// Update the pending answer in place, e.g. to accumulate chunks.
    pub(crate) fn with_pending<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Option<T>),
    {
        let mut slot = lock(&self.slot);
        if !slot.armed {
            return false;
        }
        f(&mut slot.value);
        self.cond.notify_all();
        true
    }

    pub(crate) fn abort(&self) {
        let mut slot = lock(&self.slot);
        if slot.armed {
            slot.aborted = true;
            self.cond.notify_all();
        }
    }

    pub(crate) fn wait(&self, timeout: Duration) -> Result<T> {
        self.wait_until(timeout, |_| true)
    }

    /// Block until an answer satisfying `ready` arrives, the wait is
    /// aborted, or `timeout` elapses. Disarms on return.
    pub(crate) fn wait_until<P>(&self, timeout: Duration, ready: P) -> Result<T>
    where
        P: Fn(&T) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut slot = lock(&self.slot);
        loop {
            if slot.aborted {
                slot.armed = false;
                slot.aborted = false;
                return Err(Error::Aborted {
                    operation: self.operation,
                });
            }
            if slot.value.as_ref().is_some_and(&ready) {
                slot.armed = false;
                if let Some(v) = slot.value.take() {
                    return Ok(v);
                }
            }
            let now = Instant::now();
            if now >= deadline {
                slot.armed = false;
                slot.value = None;
                return Err(Error::Timeout {
                    operation: self.operation,
                });
            }
            slot = match self.cond.wait_timeout(slot, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

/// Data accumulated for one transceive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RxFrame {
    pub complete: bool,
    pub failed: bool,
    pub bytes: Vec<u8>,
}

/// Every waiter of the engine.
#[derive(Debug)]
pub(crate) struct Waiters {
    /// Activation after select or discovery restart; `false` when the
    /// controller rejected the select
    pub activation: Waiter<bool>,
    /// Deactivation confirmation
    pub deactivation: Waiter<DeactivationKind>,
    /// Halt frame answer or timeout
    pub halt: Waiter<()>,
    pub transceive: Waiter<RxFrame>,
    pub presence: Waiter<bool>,
    pub detect: Waiter<()>,
    pub read: Waiter<(NfcStatus, Vec<u8>)>,
    pub write: Waiter<NfcStatus>,
    pub format: Waiter<NfcStatus>,
    pub read_only: Waiter<NfcStatus>,
}

impl Waiters {
    pub(crate) fn new() -> Self {
        Self {
            activation: Waiter::new("select"),
            deactivation: Waiter::new("deactivate"),
            halt: Waiter::new("halt"),
            transceive: Waiter::new("transceive"),
            presence: Waiter::new("presence check"),
            detect: Waiter::new("ndef detect"),
            read: Waiter::new("ndef read"),
            write: Waiter::new("ndef write"),
            format: Waiter::new("format"),
            read_only: Waiter::new("set read-only"),
        }
    }

    /// Force-wake every pending wait.
    pub(crate) fn abort_all(&self) {
        self.activation.abort();
        self.deactivation.abort();
        self.halt.abort();
        self.transceive.abort();
        self.presence.abort();
        self.detect.abort();
        self.read.abort();
        self.write.abort();
        self.format.abort();
        self.read_only.abort();
    }
}
