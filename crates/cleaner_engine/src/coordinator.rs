use std::sync::Arc;
use std::time::Instant;

use cleaner_core::{
    plan_batches, progress_percent, FieldSchema, RunConfig, RunEnd, RunState, RunSummary, Table,
};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::pool::{TaskContext, WorkerPool};
use crate::{
    ChatClient, CheckpointStore, ProgressEvent, ProgressSink, RowFailure, RowOutcome, RowTask,
    RunSignal,
};

#[derive(Debug, Default)]
struct RowCounts {
    succeeded: usize,
    empty: usize,
    failed: usize,
}

/// Drives a run batch by batch: fan out to the worker pool, wait for the
/// whole batch, merge results, report progress, checkpoint. The run state is
/// only consulted between batches.
pub struct BatchCoordinator {
    table: Table,
    schema: Arc<FieldSchema>,
    config: Arc<RunConfig>,
    client: Arc<dyn ChatClient>,
    store: Arc<dyn CheckpointStore>,
    sink: Arc<dyn ProgressSink>,
    signal: RunSignal,
}

impl BatchCoordinator {
    pub fn new(
        table: Table,
        schema: FieldSchema,
        config: RunConfig,
        client: Arc<dyn ChatClient>,
        store: Arc<dyn CheckpointStore>,
        sink: Arc<dyn ProgressSink>,
        signal: RunSignal,
    ) -> Self {
        Self {
            table,
            schema: Arc::new(schema),
            config: Arc::new(config),
            client,
            store,
            sink,
            signal,
        }
    }

    /// Process every batch, or stop at the first batch boundary after a stop
    /// request. Returns how the run ended and the final in-memory table.
    pub async fn run(mut self) -> (RunEnd, Table) {
        let started = Instant::now();
        let total = self.table.row_count();
        let original_columns = self.table.original_columns().to_vec();

        self.status(format!("Loaded {total} rows"));
        self.status(format!(
            "Fields to extract: {} ({} total)",
            self.schema,
            self.schema.len()
        ));
        let added_columns = self.table.add_extracted_columns(&self.schema);
        self.status(format!(
            "Speed settings: batch size={}, workers={}",
            self.config.batch_size, self.config.max_workers
        ));

        let pool = WorkerPool::new(self.config.max_workers, self.signal.shutdown_token());
        let ctx = Arc::new(TaskContext {
            client: self.client.clone(),
            schema: self.schema.clone(),
            config: self.config.clone(),
        });
        let mut counts = RowCounts::default();
        let mut finished_rows = 0;

        for batch in plan_batches(total, self.config.batch_size) {
            if !self.signal.state().is_running() {
                break;
            }
            self.status(format!("{}...", batch.label()));

            let tasks = batch
                .rows()
                .filter_map(|index| self.table.row_snapshot(index))
                .map(|row| RowTask::new(&row, &self.config.prompt_template))
                .collect();
            let outcomes = pool.run_batch(tasks, ctx.clone()).await;
            finished_rows += outcomes
                .iter()
                .filter(|outcome| !outcome.was_cancelled())
                .count();
            for outcome in outcomes {
                self.apply_outcome(outcome, &mut counts);
            }

            self.sink
                .emit(ProgressEvent::Progress(progress_percent(finished_rows, total)));

            if self.signal.state() == RunState::StoppingDiscard {
                engine_info!("{} not checkpointed: stopped without saving", batch.label());
                continue;
            }
            if self.checkpoint() {
                self.status("Batch complete, progress saved");
            }
        }

        let end = match self.signal.state() {
            RunState::StoppingDiscard => {
                self.status("Stopped; results not saved");
                RunEnd::Stopped { saved: false }
            }
            RunState::StoppingSave => {
                let saved = self.checkpoint();
                if saved {
                    self.status(format!(
                        "Stopped; results saved to {}",
                        self.store.location().display()
                    ));
                }
                RunEnd::Stopped { saved }
            }
            RunState::Running | RunState::Idle => {
                if total == 0 {
                    self.sink.emit(ProgressEvent::Progress(100.0));
                }
                self.checkpoint();
                let summary = RunSummary {
                    elapsed: started.elapsed(),
                    total_rows: total,
                    succeeded: counts.succeeded,
                    empty: counts.empty,
                    failed: counts.failed,
                    original_columns,
                    added_columns,
                    output: self.store.location().to_path_buf(),
                };
                for line in summary.status_lines() {
                    self.status(line);
                }
                RunEnd::Completed(summary)
            }
        };

        (end, self.table)
    }

    fn apply_outcome(&mut self, outcome: RowOutcome, counts: &mut RowCounts) {
        let row = outcome.index + 1;
        match outcome.result {
            Ok(fields) if fields.is_empty() => {
                counts.empty += 1;
                self.warn_status(format!("row {row}: no fields extracted"));
            }
            Ok(fields) => {
                let written = self.table.merge(outcome.index, &fields, &self.schema);
                engine_debug!("row {row}: wrote {written} cells");
                counts.succeeded += 1;
                self.status(format!("row {row}: extracted {} fields", fields.len()));
            }
            Err(err) if err.kind == RowFailure::PoolShutdown => {
                engine_debug!("row {row} skipped: {err}");
            }
            Err(err) if err.kind == RowFailure::Timeout => {
                counts.failed += 1;
                self.warn_status(format!("row {row}: timed out"));
            }
            Err(err) => {
                counts.failed += 1;
                self.warn_status(format!("row {row}: {err}"));
            }
        }
    }

    /// Persist the whole table. A failed checkpoint is reported and the run
    /// goes on.
    fn checkpoint(&self) -> bool {
        match self.store.persist(&self.table) {
            Ok(()) => true,
            Err(err) => {
                engine_error!("checkpoint to {:?} failed: {}", self.store.location(), err);
                self.sink
                    .emit(ProgressEvent::Status(format!("Checkpoint failed: {err}")));
                false
            }
        }
    }

    fn status(&self, line: impl Into<String>) {
        let line = line.into();
        engine_info!("{line}");
        self.sink.emit(ProgressEvent::Status(line));
    }

    fn warn_status(&self, line: String) {
        engine_warn!("{line}");
        self.sink.emit(ProgressEvent::Status(line));
    }
}
