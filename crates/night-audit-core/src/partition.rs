use crate::timestamp::parse_capture_timestamp;
use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};

/// Last hour (inclusive) that still belongs to the previous evening's night.
pub const NIGHT_BOUNDARY_HOUR: u32 = 12;

/// Whether a file belongs to the camera-night that starts on `night`.
///
/// A night runs from the afternoon of `night` (hour > 12) through midday of
/// the following day (hour <= 12). Files without a parseable timestamp never
/// belong to any night.
pub fn belongs_to_night(path: &str, night: NaiveDate) -> bool {
    match parse_capture_timestamp(path) {
        Some(ts) => timestamp_in_night(ts, night),
        None => false,
    }
}

pub fn timestamp_in_night(ts: NaiveDateTime, night: NaiveDate) -> bool {
    let date = ts.date();
    let hour = ts.hour();
    if date == night && hour > NIGHT_BOUNDARY_HOUR {
        return true;
    }
    night.checked_add_days(Days::new(1)) == Some(date) && hour <= NIGHT_BOUNDARY_HOUR
}

/// The night a timestamp is assigned to.
pub fn night_of(ts: NaiveDateTime) -> NaiveDate {
    if ts.hour() > NIGHT_BOUNDARY_HOUR {
        ts.date()
    } else {
        ts.date().pred_opt().unwrap_or(NaiveDate::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn test_evening_belongs_to_same_date() {
        assert!(belongs_to_night("T1_20250101_230000_001.mkv", day(1)));
        assert!(belongs_to_night("T1_20250101_130000_001.mkv", day(1)));
        assert!(!belongs_to_night("T1_20250101_230000_001.mkv", day(2)));
    }

    #[test]
    fn test_morning_belongs_to_previous_date() {
        assert!(belongs_to_night("T1_20250102_030000_002.mkv", day(1)));
        assert!(!belongs_to_night("T1_20250102_030000_002.mkv", day(2)));
    }

    #[test]
    fn test_noon_hour_is_previous_night_tail() {
        assert!(belongs_to_night("T1_20250102_120000_001.mkv", day(1)));
        assert!(belongs_to_night("T1_20250102_125959_001.mkv", day(1)));
        assert!(!belongs_to_night("T1_20250102_120000_001.mkv", day(2)));
    }

    #[test]
    fn test_unparseable_never_belongs() {
        assert!(!belongs_to_night("T1_recording.xml", day(1)));
        assert!(!belongs_to_night("", day(1)));
    }

    #[test]
    fn test_exactly_one_candidate_night_for_every_hour() {
        for hour in 0..24 {
            let path = format!("T1_20250110_{:02}1500_001.mkv", hour);
            let ts = parse_capture_timestamp(&path).unwrap();
            let same_day = belongs_to_night(&path, day(10));
            let day_before = belongs_to_night(&path, day(9));
            assert!(same_day ^ day_before, "hour {} matched both or neither", hour);
            let expected = if same_day { day(10) } else { day(9) };
            assert_eq!(night_of(ts), expected);
        }
    }
}
