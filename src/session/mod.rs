//! Focus session countdown timer
//!
//! - `countdown`: `M:SS` duration parsing and formatting
//! - `timer`: the session state machine and its owner, `FocusSessions`
//! - `ticker`: background tick source (OS thread, runtime task fallback)
//! - `runner`: binds a ticker to one session and fires the notifier
//! - `notify`: completion notifiers
//! - `reflection`: saving a finished session as a calendar event

mod countdown;
mod notify;
mod reflection;
mod runner;
mod ticker;
mod timer;

pub use countdown::{format_countdown, minutes_to_countdown, parse_countdown};
pub use notify::{CompletionNotifier, LogNotifier, NotifierKind, TerminalBell, notify_completion};
pub use reflection::{Emotion, NO_EMOTION_COLOR, session_event};
pub use runner::SessionRunner;
pub use ticker::{Tick, Ticker, TickerCommand, TickerControl};
pub use timer::{
    FocusSessions, SessionSnapshot, SessionStatus, SessionTimer, SessionType, StatusChange,
    TickOutcome,
};
