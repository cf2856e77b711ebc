//! Record books over the store.
//!
//! Each book keeps the last fetched snapshot plus the message of the last
//! failed fetch, and keeps the snapshot in step with its own writes.

use crate::utils::time::parse_start;
use std::cmp::Reverse;

pub mod cases;
pub mod clients;
pub mod dashboard;
pub mod documents;
pub mod events;
pub mod settings;

pub use cases::CaseBook;
pub use clients::ClientBook;
pub use dashboard::{
    AlertPriority, Dashboard, DashboardLimits, DashboardSources, DeadlineAlert, Kpis, UpcomingHearing,
};
pub use documents::DocumentBook;
pub use events::EventBook;
pub use settings::SettingsService;

/// Sort by creation instant, newest first. Rows without a readable
/// timestamp go last.
pub(crate) fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> Option<&str>) {
    rows.sort_by_cached_key(|row| {
        Reverse(created_at(row).and_then(|raw| parse_start(raw, chrono_tz::UTC)))
    });
}
