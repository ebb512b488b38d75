use std::future::Future;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cleaner_core::{RunEnd, RunPlan, RunState, StartError, StopMode, Table};
use engine_logging::{engine_error, engine_info, engine_warn};
use tokio::runtime::Runtime;

use crate::progress::ChannelProgressSink;
use crate::{
    load_table, BatchCoordinator, ChatClient, ClientSettings, CsvTableStore, ProgressEvent,
    ReqwestChatClient, RunSignal,
};

/// Drive `run` to its end on `runtime`, then return the signal to Idle and
/// report how the run ended. A panic inside the run is reported as
/// [`RunEnd::Failed`].
fn finish_run<F>(
    runtime: &Runtime,
    run: F,
    signal: &RunSignal,
    event_tx: &mpsc::Sender<ProgressEvent>,
) where
    F: Future<Output = (RunEnd, Table)> + Send + 'static,
{
    let end = match runtime.block_on(runtime.spawn(run)) {
        Ok((end, _table)) => end,
        Err(err) => {
            engine_error!("run aborted: {err}");
            RunEnd::Failed(format!("run aborted: {err}"))
        }
    };
    signal.finish();
    let _ = event_tx.send(ProgressEvent::RunEnded(end));
}

/// Owns the run lifecycle and the consumer half of the progress channel.
///
/// A run executes on its own thread with a multi-threaded tokio runtime sized
/// to the worker count; the caller polls [`RunController::try_recv`] on its
/// own schedule.
pub struct RunController {
    client: Arc<dyn ChatClient>,
    signal: RunSignal,
    event_tx: mpsc::Sender<ProgressEvent>,
    event_rx: mpsc::Receiver<ProgressEvent>,
    utf8_bom: bool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RunController {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            client,
            signal: RunSignal::new(),
            event_tx,
            event_rx,
            utf8_bom: false,
            worker: Mutex::new(None),
        }
    }

    /// Controller talking to a real chat-completion endpoint.
    pub fn with_settings(settings: ClientSettings) -> Result<Self, StartError> {
        let client = ReqwestChatClient::new(settings)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn with_bom(mut self, utf8_bom: bool) -> Self {
        self.utf8_bom = utf8_bom;
        self
    }

    /// Idle -> Running. Loads the input, checks the output is writable and
    /// not locked, then spawns the run. No table is written on failure; a
    /// missing output directory may already have been created.
    pub fn start(&self, plan: RunPlan) -> Result<(), StartError> {
        if !self.signal.begin() {
            return Err(StartError::AlreadyRunning);
        }
        if let Err(err) = self.launch(plan) {
            engine_warn!("run not started: {err}");
            self.signal.finish();
            return Err(err);
        }
        Ok(())
    }

    fn launch(&self, plan: RunPlan) -> Result<(), StartError> {
        let table = load_table(&plan.input)?;
        let store = CsvTableStore::new(&plan.output).with_bom(self.utf8_bom);
        store.ensure_writable()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(plan.config.max_workers.max(1))
            .enable_all()
            .build()
            .map_err(|err| StartError::Runtime(err.to_string()))?;

        engine_info!(
            "starting run: input={:?} output={:?} rows={} fields={}",
            plan.input,
            plan.output,
            table.row_count(),
            plan.schema.len()
        );
        let coordinator = BatchCoordinator::new(
            table,
            plan.schema,
            plan.config,
            self.client.clone(),
            Arc::new(store),
            Arc::new(ChannelProgressSink::new(self.event_tx.clone())),
            self.signal.clone(),
        );

        let signal = self.signal.clone();
        let event_tx = self.event_tx.clone();
        let handle = thread::Builder::new()
            .name("cleaner-run".to_string())
            .spawn(move || finish_run(&runtime, coordinator.run(), &signal, &event_tx))
            .map_err(|err| StartError::Runtime(err.to_string()))?;

        let previous = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            let _ = previous.join();
        }
        Ok(())
    }

    /// Finish the in-flight batch, then persist once more.
    pub fn stop_and_save(&self) -> bool {
        self.stop(StopMode::Save)
    }

    /// Finish the in-flight batch without persisting it.
    pub fn stop_no_save(&self) -> bool {
        self.stop(StopMode::Discard)
    }

    /// Returns false when the request is ignored (not running, or a stop is
    /// already under way).
    pub fn stop(&self, mode: StopMode) -> bool {
        let honored = self.signal.request_stop(mode);
        if honored {
            engine_info!("stop requested: {mode:?}");
        }
        honored
    }

    pub fn state(&self) -> RunState {
        self.signal.state()
    }

    /// Handle for requesting stops from another thread.
    pub fn signal(&self) -> RunSignal {
        self.signal.clone()
    }

    pub fn try_recv(&self) -> Option<ProgressEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ProgressEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Block until the current run thread, if any, has exited.
    pub fn wait(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}
