use indicatif::{ProgressBar, ProgressStyle};
use night_audit_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress reporter using indicatif progress bars.
///
/// - Listing phase: spinner (listing size unknown upfront)
/// - Reconcile phase: bar over camera x date cells
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_listing_start(&self) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message("Listing files...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_listing_complete(&self, cameras: usize, video_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Listing complete: {} cameras, {} video files in {:.2}s",
            cameras, video_files, duration_secs
        );
    }

    fn on_reconcile_start(&self, total_cells: usize) {
        let pb = ProgressBar::new(total_cells as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Camera Nights [{bar:30.cyan/dim}] {pos}/{len} ({eta} remaining)",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_cell_complete(&self, _cells_done: usize, _total_cells: usize) {
        // Cells finish out of order across worker threads
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.inc(1);
            }
        }
    }

    fn on_reconcile_complete(&self, diagnostics: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Reconcile complete: {} diagnostics in {:.2}s",
            diagnostics, duration_secs
        );
    }
}
