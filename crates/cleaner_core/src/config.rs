use std::path::PathBuf;
use std::time::Duration;

use crate::{FieldSchema, StartError};

/// Per-row deadline covering the whole remote call.
pub const DEFAULT_ROW_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_MAX_WORKERS: usize = 4;
/// First retry delay; doubles on every further attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Immutable configuration of one run, built once at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub api_key: String,
    pub prompt_template: String,
    pub batch_size: usize,
    pub max_workers: usize,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub row_timeout: Duration,
}

impl RunConfig {
    pub fn new(api_key: impl Into<String>, prompt_template: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            prompt_template: prompt_template.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_workers: DEFAULT_MAX_WORKERS,
            max_retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            row_timeout: DEFAULT_ROW_TIMEOUT,
        }
    }

    fn validate(&self) -> Result<(), StartError> {
        if self.api_key.trim().is_empty() {
            return Err(StartError::MissingCredential);
        }
        if self.batch_size == 0 {
            return Err(StartError::InvalidSettings("batch size must be at least 1".into()));
        }
        if self.max_workers == 0 {
            return Err(StartError::InvalidSettings("max workers must be at least 1".into()));
        }
        if self.row_timeout.is_zero() {
            return Err(StartError::InvalidSettings("row timeout must be positive".into()));
        }
        Ok(())
    }
}

/// Everything a run needs, checked before any work begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub schema: FieldSchema,
    pub config: RunConfig,
}

impl RunPlan {
    /// Check the credential, paths and settings, then derive the schema from
    /// the prompt template. File access is checked later by the engine.
    pub fn prepare(
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        config: RunConfig,
    ) -> Result<Self, StartError> {
        config.validate()?;
        let (input, output) = match (non_empty(input), non_empty(output)) {
            (Some(input), Some(output)) => (input, output),
            _ => return Err(StartError::MissingPaths),
        };
        let schema = FieldSchema::from_template(&config.prompt_template)?;
        Ok(Self {
            input,
            output,
            schema,
            config,
        })
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}
