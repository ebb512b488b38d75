use std::ops::Range;

/// Contiguous range of row indices scheduled together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based batch number.
    pub number: usize,
    pub start: usize,
    pub end: usize,
}

impl Batch {
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `Batch 2 (rows 6-10)` with 1-based inclusive row numbers.
    pub fn label(&self) -> String {
        format!("Batch {} (rows {}-{})", self.number, self.start + 1, self.end)
    }
}

/// Split `total_rows` into batches of `batch_size`; the last may be shorter.
/// A zero batch size is treated as one.
pub fn plan_batches(total_rows: usize, batch_size: usize) -> Vec<Batch> {
    let size = batch_size.max(1);
    (0..total_rows)
        .step_by(size)
        .enumerate()
        .map(|(i, start)| Batch {
            number: i + 1,
            start,
            end: (start + size).min(total_rows),
        })
        .collect()
}

/// Percentage of rows done; an empty table counts as complete.
pub fn progress_percent(completed_rows: usize, total_rows: usize) -> f64 {
    if total_rows == 0 {
        return 100.0;
    }
    (completed_rows as f64 / total_rows as f64) * 100.0
}
