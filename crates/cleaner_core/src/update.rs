use crate::{AppState, Effect, Msg, RunEnd, RunState, StopMode};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartClicked(plan) => {
            if state.run_state() != RunState::Idle {
                return (state, Vec::new());
            }
            state.run_state_mut().begin();
            state.reset_progress();
            state.push_status(format!(
                "Starting: {} -> {}",
                plan.input.display(),
                plan.output.display()
            ));
            vec![Effect::StartRun(plan)]
        }
        Msg::StartFailed(reason) => {
            state.run_state_mut().finish();
            state.push_status(format!("Start failed: {reason}"));
            Vec::new()
        }
        Msg::StopAndSaveClicked => request_stop(&mut state, StopMode::Save),
        Msg::StopNoSaveClicked => request_stop(&mut state, StopMode::Discard),
        Msg::Status(line) => {
            state.push_status(line);
            Vec::new()
        }
        Msg::Progress(percent) => {
            if state.run_state() != RunState::Idle {
                state.set_progress(percent);
            }
            Vec::new()
        }
        Msg::RunEnded(end) => {
            if state.run_state() == RunState::Idle {
                return (state, Vec::new());
            }
            state.run_state_mut().finish();
            match end {
                RunEnd::Completed(summary) => state.set_summary(summary),
                RunEnd::Stopped { saved: true } => state.push_status("Stopped; results saved"),
                RunEnd::Stopped { saved: false } => {
                    state.push_status("Stopped; in-flight results not saved")
                }
                RunEnd::Failed(reason) => state.push_status(format!("Run failed: {reason}")),
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn request_stop(state: &mut AppState, mode: StopMode) -> Vec<Effect> {
    if state.run_state() != RunState::Running {
        return Vec::new();
    }
    state.run_state_mut().request_stop(mode);
    vec![Effect::StopRun { mode }]
}
