//! Error types for the resolver, the focus session timer and the stores.

use thiserror::Error;

use crate::session::SessionStatus;

/// A date or time expression did not match the recognized grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid date format: {0}")]
    InvalidDate(String),

    #[error("invalid time format: {0}")]
    InvalidTime(String),

    #[error("local time {0} does not exist in this timezone")]
    SkippedLocalTime(String),
}

/// A session duration was not of the form `M:SS`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid duration format: {0}")]
pub struct FormatError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("cannot change session status from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("session is {0}, it must be completed first")]
    NotCompleted(SessionStatus),
}

/// The event does not exist or belongs to another owner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unauthorized or event not found: {0}")]
pub struct CalendarError(pub String);

/// The task or intention does not exist or belongs to another owner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    #[error("Task not found or access denied: {0}")]
    TaskNotFound(String),

    #[error("Intention not found or access denied: {0}")]
    IntentionNotFound(String),
}
