use crate::error::Result;
use crate::matrix::CountMatrix;
use crate::partition::night_of;
use crate::progress::ProgressReporter;
use crate::timestamp::parse_capture_timestamp;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Metadata files with this in their path below the camera folder are
/// recorder artifacts, not detection sidecars, and never count.
pub const RECORDING_MARKER: &str = "recording";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
    CountMismatch,
    MissingMetadata,
    MissingVideo,
}

impl DiagnosticKind {
    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticKind::CountMismatch => "video and metadata counts differ",
            DiagnosticKind::MissingMetadata => {
                "videos without metadata, usually caused by an incomplete upload"
            }
            DiagnosticKind::MissingVideo => {
                "metadata without videos, usually caused by an incomplete upload"
            }
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DiagnosticKind::CountMismatch => "count mismatch",
            DiagnosticKind::MissingMetadata => "missing metadata",
            DiagnosticKind::MissingVideo => "missing video",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub camera_id: String,
    pub date: NaiveDate,
    pub kind: DiagnosticKind,
    pub video_count: u32,
    pub metadata_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroByteFile {
    pub camera_id: String,
    pub date: NaiveDate,
    pub path: String,
}

/// A size query that failed; the file is left out of zero-byte detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeQueryFailure {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub matrix: CountMatrix,
    pub diagnostics: Vec<Diagnostic>,
    pub zero_byte_files: Vec<ZeroByteFile>,
    pub size_failures: Vec<SizeQueryFailure>,
}

/// Checks evaluated for one camera-night, independently of each other.
/// An empty night (no video, no metadata) is not flagged.
pub fn diagnose(video_count: u32, metadata_count: u32) -> Vec<DiagnosticKind> {
    let mut kinds = Vec::new();
    if metadata_count != video_count {
        kinds.push(DiagnosticKind::CountMismatch);
    }
    if metadata_count == 0 && video_count != 0 {
        kinds.push(DiagnosticKind::MissingMetadata);
    }
    if metadata_count != 0 && video_count == 0 {
        kinds.push(DiagnosticKind::MissingVideo);
    }
    kinds
}

/// Only the part of `path` after the camera folder is checked, so a datapull
/// stored under e.g. `recordings/` keeps its sidecars. Paths matched on a
/// `<camera>_` file prefix are checked on the file name.
pub fn is_recording_artifact(path: &str, camera_id: &str) -> bool {
    let segments: Vec<&str> = path.split(['/', '\\']).collect();
    let below_camera = match segments.iter().rposition(|s| *s == camera_id) {
        Some(i) => &segments[i + 1..],
        None => &segments[segments.len() - 1..],
    };
    below_camera.iter().any(|s| s.contains(RECORDING_MARKER))
}

/// Files grouped by the night their timestamp falls in. Unparseable names
/// are dropped.
fn bucket_by_night<'a, I>(paths: I) -> HashMap<NaiveDate, Vec<&'a str>>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut nights: HashMap<NaiveDate, Vec<&'a str>> = HashMap::new();
    for path in paths {
        if let Some(ts) = parse_capture_timestamp(path) {
            nights.entry(night_of(ts)).or_default().push(path.as_str());
        }
    }
    nights
}

struct CameraOutcome {
    video_counts: Vec<u32>,
    metadata_counts: Vec<u32>,
    diagnostics: Vec<Diagnostic>,
    zero_byte_files: Vec<ZeroByteFile>,
    size_failures: Vec<SizeQueryFailure>,
}

/// Buckets every camera's files into camera-nights for each date, counts
/// them, and collects diagnostics and zero-byte videos.
///
/// Cameras are processed in parallel; results are merged in camera order so
/// the output is identical to a sequential camera-major, date-minor pass.
/// A failing `file_size` call only affects that one file.
pub fn reconcile<F>(
    camera_ids: &[String],
    dates: &[NaiveDate],
    videos_by_camera: &HashMap<String, Vec<String>>,
    metadata_by_camera: &HashMap<String, Vec<String>>,
    file_size: F,
    reporter: &dyn ProgressReporter,
) -> Reconciliation
where
    F: Fn(&str) -> Result<u64> + Sync,
{
    let total_cells = camera_ids.len() * dates.len();
    let cells_done = AtomicUsize::new(0);
    reporter.on_reconcile_start(total_cells);

    let outcomes: Vec<CameraOutcome> = camera_ids
        .par_iter()
        .map(|camera_id| {
            let no_files = Vec::new();
            let videos = bucket_by_night(videos_by_camera.get(camera_id).unwrap_or(&no_files));
            let metadata = bucket_by_night(
                metadata_by_camera
                    .get(camera_id)
                    .unwrap_or(&no_files)
                    .iter()
                    .filter(|p| !is_recording_artifact(p, camera_id)),
            );
            let no_paths = Vec::new();

            let mut outcome = CameraOutcome {
                video_counts: Vec::with_capacity(dates.len()),
                metadata_counts: Vec::with_capacity(dates.len()),
                diagnostics: Vec::new(),
                zero_byte_files: Vec::new(),
                size_failures: Vec::new(),
            };

            for &date in dates {
                let night_videos = videos.get(&date).unwrap_or(&no_paths);
                let video_count = night_videos.len() as u32;
                let metadata_count = metadata.get(&date).map_or(0, Vec::len) as u32;
                outcome.video_counts.push(video_count);
                outcome.metadata_counts.push(metadata_count);

                for kind in diagnose(video_count, metadata_count) {
                    warn!(
                        camera_id = %camera_id,
                        date = %date,
                        video_count,
                        metadata_count,
                        "{}: {}",
                        kind,
                        kind.description()
                    );
                    outcome.diagnostics.push(Diagnostic {
                        camera_id: camera_id.clone(),
                        date,
                        kind,
                        video_count,
                        metadata_count,
                    });
                }

                for &path in night_videos {
                    match file_size(path) {
                        Ok(0) => outcome.zero_byte_files.push(ZeroByteFile {
                            camera_id: camera_id.clone(),
                            date,
                            path: path.to_string(),
                        }),
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Size check failed for {}: {}", path, e);
                            outcome.size_failures.push(SizeQueryFailure {
                                path: path.to_string(),
                                message: e.to_string(),
                            });
                        }
                    }
                }

                let done = cells_done.fetch_add(1, Ordering::Relaxed) + 1;
                reporter.on_cell_complete(done, total_cells);
            }
            outcome
        })
        .collect();

    let mut matrix = CountMatrix::build(camera_ids, dates);
    let mut diagnostics = Vec::new();
    let mut zero_byte_files = Vec::new();
    let mut size_failures = Vec::new();

    for (row, outcome) in outcomes.into_iter().enumerate() {
        for (col, (&videos, &metadata)) in outcome
            .video_counts
            .iter()
            .zip(outcome.metadata_counts.iter())
            .enumerate()
        {
            matrix.video.set(row, col, videos);
            matrix.metadata.set(row, col, metadata);
        }
        diagnostics.extend(outcome.diagnostics);
        zero_byte_files.extend(outcome.zero_byte_files);
        size_failures.extend(outcome.size_failures);
    }

    Reconciliation {
        matrix,
        diagnostics,
        zero_byte_files,
        size_failures,
    }
}
