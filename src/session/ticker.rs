//! Background tick source for the focus session timer.
//!
//! The ticker owns nothing but its own deadline. It receives `Start`/`Stop`
//! commands and emits [`Tick`] events; the foreground decides what a tick
//! means.

use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

/// Commands accepted by the tick worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerCommand {
    Start,
    Stop,
    Shutdown,
}

/// One elapsed tick period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

#[derive(Debug, Clone)]
enum CommandSender {
    Thread(std_mpsc::Sender<TickerCommand>),
    Task(UnboundedSender<TickerCommand>),
    Inert,
}

/// Cloneable handle for sending commands to a running [`Ticker`].
#[derive(Debug, Clone)]
pub struct TickerControl {
    sender: CommandSender,
}

impl TickerControl {
    /// Send a command; returns `false` once the worker is gone.
    pub fn send(&self, command: TickerCommand) -> bool {
        match &self.sender {
            CommandSender::Thread(tx) => tx.send(command).is_ok(),
            CommandSender::Task(tx) => tx.send(command).is_ok(),
            CommandSender::Inert => false,
        }
    }

    pub fn start(&self) -> bool {
        self.send(TickerCommand::Start)
    }

    pub fn stop(&self) -> bool {
        self.send(TickerCommand::Stop)
    }
}

enum Worker {
    Thread,
    Task(JoinHandle<()>),
    None,
}

/// Periodic tick source, stopped until it receives [`TickerCommand::Start`].
///
/// Dropping the ticker shuts the worker down, which closes the tick channel.
pub struct Ticker {
    control: TickerControl,
    worker: Worker,
}

impl Ticker {
    /// Spawn the tick worker on a dedicated OS thread named `focus-ticker`.
    ///
    /// If the thread cannot be created, falls back to a tokio interval task on
    /// the current runtime. Without a runtime the ticker is inert and never
    /// ticks.
    pub fn spawn(period: Duration) -> (Self, UnboundedReceiver<Tick>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = std_mpsc::channel();

        let thread_ticks = tick_tx.clone();
        let spawned = thread::Builder::new()
            .name("focus-ticker".to_string())
            .spawn(move || run_thread(period, cmd_rx, thread_ticks));

        match spawned {
            Ok(_) => {
                debug!(?period, "ticker thread started");
                let ticker = Self {
                    control: TickerControl {
                        sender: CommandSender::Thread(cmd_tx),
                    },
                    worker: Worker::Thread,
                };
                (ticker, tick_rx)
            }
            Err(e) => {
                warn!(error = %e, "failed to spawn ticker thread, falling back to runtime task");
                (Self::spawn_task_with(period, tick_tx), tick_rx)
            }
        }
    }

    /// Spawn the tick worker as a tokio task on the current runtime.
    pub fn spawn_task(period: Duration) -> (Self, UnboundedReceiver<Tick>) {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        (Self::spawn_task_with(period, tick_tx), tick_rx)
    }

    fn spawn_task_with(period: Duration, ticks: UnboundedSender<Tick>) -> Self {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
                let task = handle.spawn(run_task(period, cmd_rx, ticks));
                Self {
                    control: TickerControl {
                        sender: CommandSender::Task(cmd_tx),
                    },
                    worker: Worker::Task(task),
                }
            }
            Err(e) => {
                error!(error = %e, "no runtime available for ticker task, session will not tick");
                Self {
                    control: TickerControl {
                        sender: CommandSender::Inert,
                    },
                    worker: Worker::None,
                }
            }
        }
    }

    pub fn control(&self) -> TickerControl {
        self.control.clone()
    }

    pub fn start(&self) -> bool {
        self.control.start()
    }

    pub fn stop(&self) -> bool {
        self.control.stop()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.control.send(TickerCommand::Shutdown);
        match &self.worker {
            Worker::Task(task) => task.abort(),
            Worker::Thread | Worker::None => {}
        }
    }
}

fn run_thread(
    period: Duration,
    commands: std_mpsc::Receiver<TickerCommand>,
    ticks: UnboundedSender<Tick>,
) {
    let mut running = false;
    let mut deadline = Instant::now() + period;

    loop {
        if !running {
            match commands.recv() {
                Ok(TickerCommand::Start) => {
                    running = true;
                    deadline = Instant::now() + period;
                }
                Ok(TickerCommand::Stop) => {}
                Ok(TickerCommand::Shutdown) | Err(_) => break,
            }
            continue;
        }

        let timeout = deadline.saturating_duration_since(Instant::now());
        match commands.recv_timeout(timeout) {
            Ok(TickerCommand::Start) => {}
            Ok(TickerCommand::Stop) => running = false,
            Ok(TickerCommand::Shutdown) | Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                if ticks.send(Tick).is_err() {
                    break;
                }
                // Advance from the previous deadline, not from now, so the
                // period does not drift with scheduling delay.
                deadline += period;
            }
        }
    }

    debug!("ticker thread stopped");
}

async fn run_task(
    period: Duration,
    mut commands: UnboundedReceiver<TickerCommand>,
    ticks: UnboundedSender<Tick>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut running = false;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(TickerCommand::Start) => {
                    if !running {
                        running = true;
                        interval.reset();
                    }
                }
                Some(TickerCommand::Stop) => running = false,
                Some(TickerCommand::Shutdown) | None => break,
            },
            _ = interval.tick(), if running => {
                if ticks.send(Tick).is_err() {
                    break;
                }
            }
        }
    }

    debug!("ticker task stopped");
}
