use crate::{RunState, RunSummary};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub run_state: RunState,
    pub progress: f64,
    pub status_lines: Vec<String>,
    /// Lines pushed since startup, including ones dropped from `status_lines`.
    pub status_total: usize,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub last_summary: Option<RunSummary>,
    pub dirty: bool,
}
