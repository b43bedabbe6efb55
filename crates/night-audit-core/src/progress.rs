/// Trait for reporting audit progress.
///
/// The CLI implements it with indicatif bars. All methods have default
/// no-op implementations and may be called from worker threads.
pub trait ProgressReporter: Send + Sync {
    fn on_listing_start(&self) {}
    fn on_listing_complete(&self, _cameras: usize, _video_files: usize, _duration_secs: f64) {}
    fn on_reconcile_start(&self, _total_cells: usize) {}
    fn on_cell_complete(&self, _cells_done: usize, _total_cells: usize) {}
    fn on_reconcile_complete(&self, _diagnostics: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
