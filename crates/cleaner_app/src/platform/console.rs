//! Terminal rendering of the view model: new status lines and whole-percent
//! progress changes, each stamped with local time.

use chrono::Local;
use cleaner_core::AppViewModel;

#[derive(Debug, Default)]
pub struct Console {
    printed: usize,
    last_percent: Option<u32>,
}

impl Console {
    pub fn render(&mut self, view: &AppViewModel) {
        let stamp = Local::now().format("%H:%M:%S");
        for line in self.pending_lines(view) {
            println!("[{stamp}] {line}");
        }
    }

    /// Lines not yet printed, plus a progress line when the whole percentage
    /// changed during a run.
    fn pending_lines(&mut self, view: &AppViewModel) -> Vec<String> {
        let fresh = view
            .status_total
            .saturating_sub(self.printed)
            .min(view.status_lines.len());
        self.printed = view.status_total;
        let mut lines = view.status_lines[view.status_lines.len() - fresh..].to_vec();

        let percent = view.progress.floor() as u32;
        if view.run_state.is_active() && self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            lines.push(format!("progress {percent}%"));
        }
        lines
    }
}
