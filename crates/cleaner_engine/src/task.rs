use std::time::Duration;

use cleaner_core::{build_prompt, parse_response, FieldMap, FieldSchema, RowSnapshot};
use engine_logging::engine_debug;

use crate::{ChatClient, RowError, RowFailure};

/// One row's prompt, remote call and reply parsing.
#[derive(Debug, Clone)]
pub struct RowTask {
    index: usize,
    prompt: String,
}

/// Per-call limits applied by [`RowTask::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLimits {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl RowTask {
    pub fn new(row: &RowSnapshot, prompt_template: &str) -> Self {
        Self {
            index: row.index(),
            prompt: build_prompt(prompt_template, row),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Send the prompt and parse the reply against `schema`.
    ///
    /// Each attempt is bounded by `limits.timeout`. Retryable failures are
    /// retried up to `limits.max_retries` times with doubling backoff.
    pub async fn execute(
        &self,
        client: &dyn ChatClient,
        api_key: &str,
        schema: &FieldSchema,
        limits: TaskLimits,
    ) -> Result<FieldMap, RowError> {
        let mut attempt = 0;
        loop {
            let call = client.complete(api_key, &self.prompt);
            let result = match tokio::time::timeout(limits.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(RowError::new(
                    RowFailure::Timeout,
                    format!("no reply within {:?}", limits.timeout),
                )),
            };

            match result {
                Ok(reply) => return Ok(parse_response(&reply, schema)),
                Err(err) if attempt < limits.max_retries && err.kind.is_retryable() => {
                    let delay = limits.retry_backoff.saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    engine_debug!(
                        "row {} attempt {} failed ({}); retrying in {:?}",
                        self.index + 1,
                        attempt,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
