use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cleaner_core::{RunState, StopMode};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Inner {
    state: RunState,
    shutdown: CancellationToken,
}

/// Shared view of the run state. Cloning yields another handle to the same
/// state, so a stop request can come from any thread.
#[derive(Debug, Clone, Default)]
pub struct RunSignal {
    inner: Arc<Mutex<Inner>>,
}

impl RunSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.lock().state
    }

    /// Idle -> Running with a fresh shutdown token.
    pub fn begin(&self) -> bool {
        let mut inner = self.lock();
        if !inner.state.begin() {
            return false;
        }
        inner.shutdown = CancellationToken::new();
        true
    }

    /// Only honored while Running. Discarding also shuts the worker pool so
    /// rows still waiting for a worker are dropped.
    pub fn request_stop(&self, mode: StopMode) -> bool {
        let mut inner = self.lock();
        if !inner.state.request_stop(mode) {
            return false;
        }
        if mode == StopMode::Discard {
            inner.shutdown.cancel();
        }
        true
    }

    pub fn finish(&self) {
        self.lock().state.finish();
    }

    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.lock().shutdown.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
