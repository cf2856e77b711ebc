use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Naive date-time layouts accepted for `start_time`, tried in order
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an event timestamp into the given zone.
///
/// Offset-carrying timestamps (RFC 3339) are converted into `tz`; naive
/// date-times are read as wall time in `tz`; a bare date means midnight.
/// Returns `None` for anything unparseable or for a wall time that falls in
/// a DST gap.
pub fn parse_start(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz));
    }

    // Postgres renders timestamptz as "2024-05-15 11:30:00+00"
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&tz));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

/// Calendar date of a timestamp as seen in `tz`
pub fn local_date(raw: &str, tz: Tz) -> Option<NaiveDate> {
    parse_start(raw, tz).map(|dt| dt.date_naive())
}

/// Wall-clock "HH:MM" label of a timestamp in `tz`
pub fn local_time_label(raw: &str, tz: Tz) -> Option<String> {
    parse_start(raw, tz).map(|dt| dt.format("%H:%M").to_string())
}

/// Whole days from `today` until `date` (negative when past)
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_start_formats() {
        let tz = chrono_tz::UTC;

        let dt = parse_start("2024-05-15T11:30", tz).unwrap();
        assert_eq!((dt.day(), dt.hour(), dt.minute()), (15, 11, 30));

        let dt = parse_start("2024-05-15T11:30:45.120", tz).unwrap();
        assert_eq!(dt.second(), 45);

        let dt = parse_start("2024-05-15 09:00", tz).unwrap();
        assert_eq!(dt.hour(), 9);

        let dt = parse_start("2024-05-15", tz).unwrap();
        assert_eq!((dt.day(), dt.hour()), (15, 0));

        let dt = parse_start("2024-05-15T11:30:00+00:00", tz).unwrap();
        assert_eq!(dt.hour(), 11);

        let dt = parse_start("2024-05-15 11:30:00+00", tz).unwrap();
        assert_eq!(dt.hour(), 11);

        // Invalid cases
        assert!(parse_start("", tz).is_none());
        assert!(parse_start("mañana", tz).is_none());
        assert!(parse_start("2024-13-01T10:00", tz).is_none());
        assert!(parse_start("2024-02-30", tz).is_none());
    }

    #[test]
    fn test_offset_timestamps_shift_into_zone() {
        let guayaquil: Tz = "America/Guayaquil".parse().unwrap();

        // 02:00 UTC on the 16th is still the 15th in Ecuador (UTC-5)
        let date = local_date("2024-05-16T02:00:00Z", guayaquil).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());

        // Naive timestamps are already wall time, no shift
        let date = local_date("2024-05-16T02:00", guayaquil).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 16).unwrap());
    }

    #[test]
    fn test_dst_gap_and_fold() {
        let madrid: Tz = "Europe/Madrid".parse().unwrap();

        // 2024-03-31 02:30 does not exist in Madrid
        assert!(parse_start("2024-03-31T02:30", madrid).is_none());

        // 2024-10-27 02:30 happens twice; the earlier one wins
        let dt = parse_start("2024-10-27T02:30", madrid).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-10-27T02:30:00+02:00");
    }

    #[test]
    fn test_local_time_label_and_days_until() {
        let tz = chrono_tz::UTC;
        assert_eq!(local_time_label("2024-05-15T09:05", tz).as_deref(), Some("09:05"));
        assert_eq!(local_time_label("nope", tz), None);

        let today = NaiveDate::from_ymd_opt(2024, 5, 24).unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 5, 26).unwrap();
        assert_eq!(days_until(today, due), 2);
        assert_eq!(days_until(due, today), -2);
    }
}
