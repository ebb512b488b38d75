use std::path::PathBuf;
use std::time::Duration;

/// Per-row result counts and timing reported when a run completes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub total_rows: usize,
    pub succeeded: usize,
    pub empty: usize,
    pub failed: usize,
    pub original_columns: Vec<String>,
    pub added_columns: Vec<String>,
    pub output: PathBuf,
}

impl RunSummary {
    pub fn average_secs_per_row(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() / self.total_rows as f64
    }

    pub fn status_lines(&self) -> Vec<String> {
        vec![
            "Processing complete".to_string(),
            format!("Elapsed: {:.2}s", self.elapsed.as_secs_f64()),
            format!("Average per row: {:.2}s", self.average_secs_per_row()),
            format!(
                "Rows: {} extracted, {} empty, {} failed",
                self.succeeded, self.empty, self.failed
            ),
            format!("Original columns: {:?}", self.original_columns),
            format!(
                "Added columns: {:?} ({} total)",
                self.added_columns,
                self.added_columns.len()
            ),
            format!("Output file: {}", self.output.display()),
        ]
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEnd {
    Completed(RunSummary),
    /// Stopped on request; `saved` tells whether a final persist happened.
    Stopped { saved: bool },
    Failed(String),
}
