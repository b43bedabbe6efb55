use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Final `/` or `\` separated segment of a path string.
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Capture time used for night assignment.
///
/// The last `_` token of the base name is a sequence suffix and is dropped;
/// the two tokens before it must be `YYYYMMDD` and `HHMMSS`. Names with fewer
/// than two tokens, or whose tokens don't form a valid date and time, yield
/// `None`.
pub fn parse_capture_timestamp(path: &str) -> Option<NaiveDateTime> {
    let tokens: Vec<&str> = base_name(path).split('_').collect();
    if tokens.len() < 3 {
        return None;
    }
    let stamp = &tokens[..tokens.len() - 1];
    parse_date_time(stamp[stamp.len() - 2], stamp[stamp.len() - 1])
}

/// Capture time from the two leading tokens of the base name.
///
/// Camera-prefixed names (`CAM_YYYYMMDD_HHMMSS_suffix`) don't lead with a
/// date, so they fall back to [`parse_capture_timestamp`].
pub fn parse_leading_timestamp(path: &str) -> Option<NaiveDateTime> {
    let mut tokens = base_name(path).split('_');
    match (tokens.next(), tokens.next()) {
        (Some(date), Some(time)) => {
            parse_date_time(date, time).or_else(|| parse_capture_timestamp(path))
        }
        _ => None,
    }
}

fn parse_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    if !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H%M%S").ok()?;
    Some(NaiveDateTime::new(date, time))
}

fn is_digits(token: &str, len: usize) -> bool {
    token.len() == len && token.bytes().all(|b| b.is_ascii_digit())
}
