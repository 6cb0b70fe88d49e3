//! src/error.rs
//! ============================================================================
//! # Error types for the event dispatcher
//!
//! `DispatchError` is the crate-wide error. Handler failures are reported
//! through `HandlerError` (raised by a handler) and `NotifyError` (the
//! aggregate a caller of `notify` receives).

use compact_str::CompactString;
use std::{io, path::PathBuf};
use thiserror::Error;

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Unified error type for dispatcher, configuration and domain operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// One or more handlers failed while an event was being delivered.
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config rendering error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serialization or deserialization error (e.g., JSON).
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Input validation errors
    #[error("Invalid input: {field} - {message}")]
    InvalidInput {
        field: CompactString,
        message: String,
    },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl DispatchError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create an input validation error
    pub fn invalid_input<S1, S2>(field: S1, message: S2) -> Self
    where
        S1: Into<CompactString>,
        S2: Into<String>,
    {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn config_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }
}

/// Error returned by an `EventHandler` from `handle`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler was registered under a name whose events it cannot read.
    #[error("{handler} cannot handle payload of {event}")]
    UnexpectedPayload {
        handler: CompactString,
        event: CompactString,
    },

    /// Handler-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed<S: Into<String>>(reason: S) -> Self {
        Self::Failed(reason.into())
    }

    pub fn unexpected_payload<S1, S2>(handler: S1, event: S2) -> Self
    where
        S1: Into<CompactString>,
        S2: Into<CompactString>,
    {
        Self::UnexpectedPayload {
            handler: handler.into(),
            event: event.into(),
        }
    }
}

/// A single handler invocation that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Handler name as reported by `EventHandler::name`.
    pub handler: CompactString,

    /// Index of the handler in the registration sequence.
    pub position: usize,

    pub message: String,

    /// The handler panicked instead of returning an error.
    pub panicked: bool,
}

impl std::fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = if self.panicked { "panicked" } else { "failed" };
        write!(
            f,
            "handler #{} ({}) {verb}: {}",
            self.position, self.handler, self.message
        )
    }
}

/// Aggregate failure of a `notify` call.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// Every handler was invoked; some of them failed.
    #[error("{} of {invoked} handlers failed for event {event}", .failures.len())]
    HandlersFailed {
        event: CompactString,
        invoked: usize,
        failures: Vec<HandlerFailure>,
    },

    /// Delivery stopped at the first failure.
    #[error("delivery of event {event} aborted after {invoked} handlers ({skipped} skipped): {failure}")]
    Aborted {
        event: CompactString,
        invoked: usize,
        skipped: usize,
        failure: HandlerFailure,
    },
}

impl NotifyError {
    /// Name of the event whose delivery failed.
    pub fn event_name(&self) -> &str {
        match self {
            Self::HandlersFailed { event, .. } | Self::Aborted { event, .. } => event,
        }
    }

    /// Number of handlers that were invoked, failed ones included.
    pub fn invoked(&self) -> usize {
        match self {
            Self::HandlersFailed { invoked, .. } | Self::Aborted { invoked, .. } => *invoked,
        }
    }

    pub fn failures(&self) -> &[HandlerFailure] {
        match self {
            Self::HandlersFailed { failures, .. } => failures,
            Self::Aborted { failure, .. } => std::slice::from_ref(failure),
        }
    }
}
