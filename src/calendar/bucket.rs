use super::dates::YearMonth;
use crate::models::CalendarEvent;
use crate::utils::time::local_date;
use chrono::Datelike;
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Events of one displayed month, grouped by day-of-month.
///
/// Each bucket keeps the relative order of the input slice. Events outside
/// the month, or whose `start_time` does not parse, are left out.
pub fn bucketize<'a>(
    events: &'a [CalendarEvent],
    month: YearMonth,
    tz: Tz,
) -> BTreeMap<u32, Vec<&'a CalendarEvent>> {
    let mut buckets: BTreeMap<u32, Vec<&'a CalendarEvent>> = BTreeMap::new();

    for event in events {
        let Some(date) = local_date(&event.start_time, tz) else {
            continue;
        };
        if month.contains(date) {
            buckets.entry(date.day()).or_default().push(event);
        }
    }

    buckets
}
