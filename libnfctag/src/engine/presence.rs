// libnfctag/src/engine/presence.rs

//! Background presence polling of the connected tag.
//!
//! Foreground calls hold a [`PresencePause`] around their hardware access.
//! Pausing takes the check lock, so it waits for a running check to finish
//! and no check can start until the pause is released. Pause and resume both
//! arm `skip_next`, so the tick right after a foreground call is skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::engine::EngineInner;
use crate::types::ConnectionState;
use crate::utils::sync::lock;
use crate::utils::timeout::ms;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct Flags {
    paused: u32,
    skip_next: bool,
    stop: bool,
    running: bool,
    delay: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct PresenceMonitor {
    flags: Mutex<Flags>,
    cond: Condvar,
    check_lock: Mutex<()>,
    field_on: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Keeps presence checking paused while alive.
#[must_use = "presence checking resumes when the guard is dropped"]
#[derive(Debug)]
pub struct PresencePause<'a> {
    monitor: &'a PresenceMonitor,
}

impl Drop for PresencePause<'_> {
    fn drop(&mut self) {
        self.monitor.resume();
    }
}

impl PresenceMonitor {
    pub(crate) fn pause(&self) -> PresencePause<'_> {
        let _check = lock(&self.check_lock);
        let mut flags = lock(&self.flags);
        flags.paused += 1;
        flags.skip_next = true;
        PresencePause { monitor: self }
    }

    fn resume(&self) {
        let mut flags = lock(&self.flags);
        flags.paused = flags.paused.saturating_sub(1);
        flags.skip_next = true;
    }

    pub(crate) fn is_paused(&self) -> bool {
        lock(&self.flags).paused > 0
    }

    pub(crate) fn is_running(&self) -> bool {
        lock(&self.flags).running
    }

    pub(crate) fn field_on(&self) -> bool {
        self.field_on.load(Ordering::SeqCst)
    }

    pub(crate) fn set_field_on(&self, on: bool) {
        self.field_on.store(on, Ordering::SeqCst);
    }

    /// Start polling every `delay`. A running loop is replaced.
    pub(crate) fn start(&self, engine: &Arc<EngineInner>, delay: Duration) -> Result<()> {
        self.stop();
        {
            let mut flags = lock(&self.flags);
            flags.stop = false;
            flags.running = true;
            flags.skip_next = false;
            flags.delay = delay;
        }
        self.set_field_on(true);

        let weak = Arc::downgrade(engine);
        let spawned = thread::Builder::new()
            .name("nfc-presence".into())
            .spawn(move || watchdog(weak));
        match spawned {
            Ok(handle) => {
                *lock(&self.handle) = Some(handle);
                debug!("presence: checking every {:?}", delay);
                Ok(())
            }
            Err(e) => {
                lock(&self.flags).running = false;
                warn!("presence: cannot spawn watchdog: {}", e);
                Err(Error::UnsupportedOperation(format!(
                    "presence watchdog: {}",
                    e
                )))
            }
        }
    }

    /// Stop polling and wait for the loop to exit.
    pub(crate) fn stop(&self) {
        {
            let mut flags = lock(&self.flags);
            flags.stop = true;
        }
        self.cond.notify_all();

        let handle = lock(&self.handle).take();
        if let Some(handle) = handle {
            // on_tag_lost listeners may stop checking from the watchdog itself
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("presence: watchdog panicked");
            }
        }
    }

    fn stop_requested(&self) -> bool {
        lock(&self.flags).stop
    }

    /// Sleep one interval. Returns false once stopped.
    fn tick(&self) -> bool {
        let mut flags = lock(&self.flags);
        if flags.stop {
            return false;
        }
        if flags.paused == 0 {
            flags.skip_next = false;
        }
        let delay = flags.delay;
        let (flags, _) = match self.cond.wait_timeout_while(flags, delay, |f| !f.stop) {
            Ok(r) => r,
            Err(poisoned) => poisoned.into_inner(),
        };
        !flags.stop
    }

    fn should_skip(&self) -> bool {
        let flags = lock(&self.flags);
        flags.paused > 0 || flags.skip_next
    }

    fn finished(&self) {
        lock(&self.flags).running = false;
    }
}

enum Outcome {
    Present,
    /// Nothing was sent this tick
    Skipped,
    Lost,
    Stop,
}

fn watchdog(weak: Weak<EngineInner>) {
    loop {
        let Some(engine) = weak.upgrade() else {
            return;
        };
        let monitor = &engine.presence;
        if !monitor.tick() {
            break;
        }

        match check_once(&engine) {
            Outcome::Present | Outcome::Skipped => continue,
            Outcome::Stop => break,
            Outcome::Lost => {
                monitor.set_field_on(false);
                info!("presence: tag left the field");
                engine.disconnect_lost();
                break;
            }
        }
    }
    if let Some(engine) = weak.upgrade() {
        engine.presence.finished();
    }
}

/// One tick under the check lock. Only a released tag ends the loop; a
/// tag that is paused, sleeping in a reselect or not yet re-activated is
/// skipped until the next tick.
fn check_once(engine: &EngineInner) -> Outcome {
    let monitor = &engine.presence;
    let _check = lock(&monitor.check_lock);
    if monitor.stop_requested() {
        return Outcome::Stop;
    }
    if monitor.should_skip() {
        return Outcome::Skipped;
    }

    let conn = engine.connection();
    if conn.tag.is_none() {
        debug!("presence: tag released, stopping");
        return Outcome::Stop;
    }
    match conn.state {
        ConnectionState::Active | ConnectionState::Inactive => {}
        other => {
            debug!("presence: tag in {}, skipping check", other);
            return Outcome::Skipped;
        }
    }

    let waiter = &engine.waiters.presence;
    waiter.arm();
    let result = match engine.channel.presence_check() {
        Ok(()) => waiter.wait(ms(engine.config.presence_wait_ms)),
        Err(e) => {
            waiter.disarm();
            Err(e)
        }
    };
    match result {
        Ok(true) => Outcome::Present,
        Ok(false) => Outcome::Lost,
        Err(Error::Aborted { .. }) => Outcome::Stop,
        Err(e) => {
            warn!("presence: check failed: {}", e);
            Outcome::Lost
        }
    }
}
