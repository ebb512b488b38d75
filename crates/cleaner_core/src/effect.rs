use crate::RunPlan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartRun(Box<RunPlan>),
    StopRun { mode: StopMode },
}

/// What happens to the table when a run is stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Finish the in-flight batch, then persist the current table once more.
    Save,
    /// Finish the in-flight batch without persisting it.
    Discard,
}
