#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked to start a run with a prepared plan.
    StartClicked(Box<crate::RunPlan>),
    /// The engine refused to start the run.
    StartFailed(String),
    /// User clicked "stop and save".
    StopAndSaveClicked,
    /// User clicked "stop without saving".
    StopNoSaveClicked,
    /// Status line from the engine.
    Status(String),
    /// Overall progress from the engine, 0..=100.
    Progress(f64),
    /// The engine finished the run.
    RunEnded(crate::RunEnd),
    /// Poll tick; lets the loop render without an engine event.
    Tick,
}
