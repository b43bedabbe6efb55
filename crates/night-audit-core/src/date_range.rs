use crate::error::{Error, Result};
use crate::timestamp::parse_leading_timestamp;
use chrono::NaiveDate;

/// Every calendar date from the earliest to the latest video capture date,
/// inclusive and without gaps.
pub fn derive_date_range<S: AsRef<str>>(video_paths: &[S]) -> Result<Vec<NaiveDate>> {
    if video_paths.is_empty() {
        return Err(Error::EmptyInput("no video files found".to_string()));
    }

    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for path in video_paths {
        if let Some(ts) = parse_leading_timestamp(path.as_ref()) {
            let date = ts.date();
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(date), max.max(date)),
                None => (date, date),
            });
        }
    }

    let (start, end) = bounds.ok_or_else(|| {
        Error::EmptyInput(format!(
            "none of {} video file names carry a capture timestamp",
            video_paths.len()
        ))
    })?;

    Ok(start.iter_days().take_while(|d| *d <= end).collect())
}
