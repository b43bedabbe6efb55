use crate::date_range::derive_date_range;
use crate::error::Error;
use crate::matrix::CountMatrix;
use crate::progress::ProgressReporter;
use crate::provider::FileListingProvider;
use crate::reconcile::{self, Diagnostic, SizeQueryFailure, ZeroByteFile};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Drop a trailing date column that has no video for any camera.
    pub trim_empty_last_date: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            trim_empty_last_date: true,
        }
    }
}

pub struct AuditEngine<'a> {
    provider: &'a dyn FileListingProvider,
    options: AuditOptions,
}

#[derive(Debug)]
pub struct AuditReport {
    pub matrix: CountMatrix,
    pub diagnostics: Vec<Diagnostic>,
    pub zero_byte_files: Vec<ZeroByteFile>,
    pub size_failures: Vec<SizeQueryFailure>,
    pub trimmed_date: Option<NaiveDate>,
    pub total_video_files: u64,
    pub total_metadata_files: u64,
    pub listing_duration: Duration,
    pub reconcile_duration: Duration,
}

impl<'a> AuditEngine<'a> {
    pub fn new(provider: &'a dyn FileListingProvider) -> Self {
        Self {
            provider,
            options: AuditOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AuditOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the full audit:
    /// 1. List cameras and the whole video corpus, derive the date axis
    /// 2. List each camera's videos and metadata once
    /// 3. Reconcile every camera-night
    /// 4. Optionally trim an empty trailing date
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<AuditReport, Error> {
        info!("Listing files...");
        reporter.on_listing_start();
        let listing_start = Instant::now();

        let camera_ids = self.provider.list_camera_ids()?;
        let all_videos = self.provider.list_video_paths(None)?;
        let dates = derive_date_range(&all_videos)?;

        let mut videos_by_camera = HashMap::with_capacity(camera_ids.len());
        let mut metadata_by_camera = HashMap::with_capacity(camera_ids.len());
        for camera_id in &camera_ids {
            let videos = self.provider.list_video_paths(Some(camera_id))?;
            let metadata = self.provider.list_metadata_paths(Some(camera_id))?;
            debug!(
                "{}: {} video files, {} metadata files",
                camera_id,
                videos.len(),
                metadata.len()
            );
            videos_by_camera.insert(camera_id.clone(), videos);
            metadata_by_camera.insert(camera_id.clone(), metadata);
        }

        let listing_duration = listing_start.elapsed();
        reporter.on_listing_complete(
            camera_ids.len(),
            all_videos.len(),
            listing_duration.as_secs_f64(),
        );
        info!(
            "{} cameras, {} dates ({} to {})",
            camera_ids.len(),
            dates.len(),
            dates[0],
            dates[dates.len() - 1]
        );

        info!("Reconciling camera nights...");
        let reconcile_start = Instant::now();
        let result = reconcile::reconcile(
            &camera_ids,
            &dates,
            &videos_by_camera,
            &metadata_by_camera,
            |path| self.provider.file_size(path),
            reporter,
        );
        let reconcile_duration = reconcile_start.elapsed();
        reporter.on_reconcile_complete(result.diagnostics.len(), reconcile_duration.as_secs_f64());
        debug!(
            "Reconcile completed in {:.2}s: {} diagnostics, {} zero-byte files",
            reconcile_duration.as_secs_f64(),
            result.diagnostics.len(),
            result.zero_byte_files.len(),
        );

        let mut matrix = result.matrix;
        let total_video_files = matrix.video.total();
        let total_metadata_files = matrix.metadata.total();
        let trimmed_date = if self.options.trim_empty_last_date {
            matrix.trim_empty_trailing_date()
        } else {
            None
        };
        if let Some(date) = trimmed_date {
            info!("Dropped empty trailing date {}", date);
        }

        Ok(AuditReport {
            matrix,
            diagnostics: result.diagnostics,
            zero_byte_files: result.zero_byte_files,
            size_failures: result.size_failures,
            trimmed_date,
            total_video_files,
            total_metadata_files,
            listing_duration,
            reconcile_duration,
        })
    }
}
