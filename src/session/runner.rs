use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::notify::{CompletionNotifier, notify_completion};
use super::ticker::{Tick, Ticker, TickerControl};
use super::timer::{FocusSessions, TickOutcome};

enum Driver {
    Task(JoinHandle<()>),
    Thread,
    None,
}

/// Drives one focus session from a background [`Ticker`].
///
/// The driver applies each tick to the shared [`FocusSessions`] under its
/// serial. When the session completes it stops the ticker, calls the notifier
/// and exits. A stale serial (cancelled or replaced session) ends the driver
/// without touching the newer session.
pub struct SessionRunner {
    serial: u64,
    ticker: Option<Ticker>,
    driver: Driver,
}

impl SessionRunner {
    /// Start ticking session `serial` every `period`.
    pub fn spawn(
        sessions: Arc<Mutex<FocusSessions>>,
        serial: u64,
        period: Duration,
        notifier: Arc<dyn CompletionNotifier>,
    ) -> Self {
        let (ticker, ticks) = Ticker::spawn(period);
        let control = ticker.control();

        let driver = match tokio::runtime::Handle::try_current() {
            Ok(handle) => Driver::Task(handle.spawn(drive(
                ticks, sessions, serial, control, notifier,
            ))),
            Err(_) => {
                let spawned = thread::Builder::new()
                    .name("focus-driver".to_string())
                    .spawn(move || drive_blocking(ticks, sessions, serial, control, notifier));
                match spawned {
                    Ok(_) => Driver::Thread,
                    Err(e) => {
                        error!(error = %e, "failed to spawn session driver");
                        Driver::None
                    }
                }
            }
        };

        ticker.start();
        info!(serial, ?period, "session runner started");

        Self {
            serial,
            ticker: Some(ticker),
            driver,
        }
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Stop ticking; the session keeps its remaining time.
    pub fn pause(&self) {
        if let Some(ticker) = &self.ticker {
            ticker.stop();
        }
    }

    /// Resume ticking with a fresh period.
    pub fn resume(&self) {
        if let Some(ticker) = &self.ticker {
            ticker.start();
        }
    }

    /// Whether the driver is still consuming ticks.
    pub fn is_active(&self) -> bool {
        match &self.driver {
            Driver::Task(task) => !task.is_finished(),
            Driver::Thread => self.ticker.is_some(),
            Driver::None => false,
        }
    }

    /// Stop the ticker and the driver. Returns once no further tick can be
    /// applied by this runner.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.ticker.take();
        if let Driver::Task(task) = &self.driver {
            task.abort();
        }
        debug!(serial = self.serial, "session runner stopped");
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        if self.ticker.is_some() {
            self.stop();
        }
    }
}

async fn drive(
    mut ticks: UnboundedReceiver<Tick>,
    sessions: Arc<Mutex<FocusSessions>>,
    serial: u64,
    control: TickerControl,
    notifier: Arc<dyn CompletionNotifier>,
) {
    while ticks.recv().await.is_some() {
        if apply_tick(&sessions, serial, &control, notifier.as_ref()) {
            break;
        }
    }
}

fn drive_blocking(
    mut ticks: UnboundedReceiver<Tick>,
    sessions: Arc<Mutex<FocusSessions>>,
    serial: u64,
    control: TickerControl,
    notifier: Arc<dyn CompletionNotifier>,
) {
    while ticks.blocking_recv().is_some() {
        if apply_tick(&sessions, serial, &control, notifier.as_ref()) {
            break;
        }
    }
}

/// Apply one tick; returns `true` when the driver should exit.
fn apply_tick(
    sessions: &Mutex<FocusSessions>,
    serial: u64,
    control: &TickerControl,
    notifier: &dyn CompletionNotifier,
) -> bool {
    let outcome = sessions.lock().unwrap().tick(serial);
    match outcome {
        TickOutcome::Ticked { time_left } => {
            debug!(serial, %time_left, "tick");
            false
        }
        TickOutcome::Ignored => false,
        TickOutcome::Completed(snapshot) => {
            control.stop();
            notify_completion(notifier, &snapshot);
            true
        }
        TickOutcome::Stale => {
            control.stop();
            debug!(serial, "session gone, driver exiting");
            true
        }
    }
}
