use std::fmt;

use cleaner_core::{FieldMap, RunEnd};

/// Items carried by the progress channel from the run to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Status(String),
    /// Overall progress, 0..=100.
    Progress(f64),
    RunEnded(RunEnd),
}

/// Result of one row task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    pub index: usize,
    pub result: Result<FieldMap, RowError>,
}

impl RowOutcome {
    /// The row never got a worker because the pool shut down.
    pub fn was_cancelled(&self) -> bool {
        matches!(&self.result, Err(err) if err.kind == RowFailure::PoolShutdown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RowError {
    pub kind: RowFailure,
    pub message: String,
}

impl RowError {
    pub(crate) fn new(kind: RowFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFailure {
    Timeout,
    HttpStatus(u16),
    Network,
    MalformedResponse,
    /// The pool was shut down before the row got a worker.
    PoolShutdown,
    WorkerCrashed,
}

impl RowFailure {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RowFailure::Timeout | RowFailure::Network => true,
            RowFailure::HttpStatus(code) => *code == 429 || *code >= 500,
            RowFailure::MalformedResponse
            | RowFailure::PoolShutdown
            | RowFailure::WorkerCrashed => false,
        }
    }
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFailure::Timeout => write!(f, "timeout"),
            RowFailure::HttpStatus(code) => write!(f, "http status {code}"),
            RowFailure::Network => write!(f, "network error"),
            RowFailure::MalformedResponse => write!(f, "malformed response"),
            RowFailure::PoolShutdown => write!(f, "worker pool shut down"),
            RowFailure::WorkerCrashed => write!(f, "worker crashed"),
        }
    }
}
