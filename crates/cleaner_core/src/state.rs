use std::collections::VecDeque;

use crate::view_model::AppViewModel;
use crate::{RunSummary, StopMode};

/// Status lines kept for display; older lines are dropped.
pub const STATUS_HISTORY_LIMIT: usize = 500;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    StoppingSave,
    StoppingDiscard,
}

impl RunState {
    /// Idle -> Running. Returns false and stays put from any other state.
    pub fn begin(&mut self) -> bool {
        if *self != RunState::Idle {
            return false;
        }
        *self = RunState::Running;
        true
    }

    /// Running -> StoppingSave / StoppingDiscard. Only the first stop request
    /// is honored; anything else is a no-op returning false.
    pub fn request_stop(&mut self, mode: StopMode) -> bool {
        if *self != RunState::Running {
            return false;
        }
        *self = match mode {
            StopMode::Save => RunState::StoppingSave,
            StopMode::Discard => RunState::StoppingDiscard,
        };
        true
    }

    /// Any state -> Idle.
    pub fn finish(&mut self) {
        *self = RunState::Idle;
    }

    pub fn is_running(self) -> bool {
        self == RunState::Running
    }

    pub fn is_active(self) -> bool {
        self != RunState::Idle
    }

    pub fn stop_mode(self) -> Option<StopMode> {
        match self {
            RunState::StoppingSave => Some(StopMode::Save),
            RunState::StoppingDiscard => Some(StopMode::Discard),
            RunState::Idle | RunState::Running => None,
        }
    }
}

/// Presentation-side state: what the user sees of the current run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    run_state: RunState,
    progress: f64,
    status_lines: VecDeque<String>,
    status_total: usize,
    last_summary: Option<RunSummary>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            run_state: self.run_state,
            progress: self.progress,
            status_lines: self.status_lines.iter().cloned().collect(),
            status_total: self.status_total,
            start_enabled: self.run_state == RunState::Idle,
            stop_enabled: self.run_state == RunState::Running,
            last_summary: self.last_summary.clone(),
            dirty: self.dirty,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn run_state_mut(&mut self) -> &mut RunState {
        self.dirty = true;
        &mut self.run_state
    }

    pub(crate) fn push_status(&mut self, line: impl Into<String>) {
        if self.status_lines.len() == STATUS_HISTORY_LIMIT {
            self.status_lines.pop_front();
        }
        self.status_lines.push_back(line.into());
        self.status_total += 1;
        self.dirty = true;
    }

    pub(crate) fn reset_progress(&mut self) {
        self.progress = 0.0;
        self.last_summary = None;
        self.dirty = true;
    }

    /// Progress never moves backwards within a run.
    pub(crate) fn set_progress(&mut self, percent: f64) {
        let clamped = percent.clamp(0.0, 100.0);
        if clamped > self.progress {
            self.progress = clamped;
            self.dirty = true;
        }
    }

    pub(crate) fn set_summary(&mut self, summary: RunSummary) {
        self.last_summary = Some(summary);
        self.dirty = true;
    }
}
