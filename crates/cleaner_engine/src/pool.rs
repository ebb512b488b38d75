use std::sync::Arc;

use cleaner_core::{FieldSchema, RunConfig};
use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::task::TaskLimits;
use crate::{ChatClient, RowError, RowFailure, RowOutcome, RowTask};

/// Read-only inputs shared by every row task of a run.
pub struct TaskContext {
    pub client: Arc<dyn ChatClient>,
    pub schema: Arc<FieldSchema>,
    pub config: Arc<RunConfig>,
}

impl TaskContext {
    fn limits(&self) -> TaskLimits {
        TaskLimits {
            timeout: self.config.row_timeout,
            max_retries: self.config.max_retries,
            retry_backoff: self.config.retry_backoff,
        }
    }
}

/// At most `size` row tasks run at once; each worker runs a task to completion
/// before taking the next.
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    shutdown: CancellationToken,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize, shutdown: CancellationToken) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            shutdown,
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Stop handing out workers. Tasks already running are not interrupted;
    /// tasks still waiting fail with [`RowFailure::PoolShutdown`].
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Run every task and wait for all of them. Outcomes come back in task order.
    pub async fn run_batch(&self, tasks: Vec<RowTask>, ctx: Arc<TaskContext>) -> Vec<RowOutcome> {
        let mut indices = Vec::with_capacity(tasks.len());
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            indices.push(task.index());
            let permits = self.permits.clone();
            let shutdown = self.shutdown.clone();
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        return Err(RowError::new(RowFailure::PoolShutdown, "not started"));
                    }
                    permit = permits.acquire_owned() => permit
                        .map_err(|_| RowError::new(RowFailure::PoolShutdown, "pool closed"))?,
                };
                task.execute(
                    ctx.client.as_ref(),
                    &ctx.config.api_key,
                    &ctx.schema,
                    ctx.limits(),
                )
                .await
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .zip(indices)
            .map(|(joined, index)| RowOutcome {
                index,
                result: joined.unwrap_or_else(|err| {
                    Err(RowError::new(RowFailure::WorkerCrashed, err.to_string()))
                }),
            })
            .collect()
    }
}
