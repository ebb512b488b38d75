use std::collections::VecDeque;

use cleaner_core::{Effect, Msg};
use cleaner_engine::{ProgressEvent, RunController};
use engine_logging::{engine_info, engine_warn};

/// Carries out effects on the run controller and turns engine events back
/// into messages.
pub struct EffectRunner {
    controller: RunController,
}

impl EffectRunner {
    pub fn new(controller: RunController) -> Self {
        Self { controller }
    }

    /// Follow-up messages (start failures) are pushed onto `inbox`.
    pub fn enqueue(&self, effects: Vec<Effect>, inbox: &mut VecDeque<Msg>) {
        for effect in effects {
            match effect {
                Effect::StartRun(plan) => {
                    engine_info!(
                        "StartRun input={:?} output={:?} fields={}",
                        plan.input,
                        plan.output,
                        plan.schema
                    );
                    if let Err(err) = self.controller.start(*plan) {
                        engine_warn!("start refused: {}", err);
                        inbox.push_back(Msg::StartFailed(err.to_string()));
                    }
                }
                Effect::StopRun { mode } => {
                    if !self.controller.stop(mode) {
                        engine_info!("stop {:?} ignored; run already stopping", mode);
                    }
                }
            }
        }
    }

    /// Move every pending engine event onto `inbox`.
    pub fn drain_events(&self, inbox: &mut VecDeque<Msg>) {
        while let Some(event) = self.controller.try_recv() {
            inbox.push_back(map_event(event));
        }
    }

    pub fn wait(&self) {
        self.controller.wait();
    }
}

fn map_event(event: ProgressEvent) -> Msg {
    match event {
        ProgressEvent::Status(line) => Msg::Status(line),
        ProgressEvent::Progress(percent) => Msg::Progress(percent),
        ProgressEvent::RunEnded(end) => Msg::RunEnded(end),
    }
}
