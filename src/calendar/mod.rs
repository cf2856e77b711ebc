//! Month calendar: date helpers, event bucketing, grid building and
//! month navigation. Everything here is synchronous and side-effect free;
//! the grid is rebuilt from scratch whenever the event snapshot or the
//! displayed month changes.

pub mod bucket;
pub mod clock;
pub mod dates;
pub mod grid;
pub mod labels;
pub mod navigation;

pub use bucket::bucketize;
pub use clock::{Clock, FixedClock, SystemClock};
pub use dates::{days_in_month, first_weekday_of_month, YearMonth};
pub use grid::{CalendarAction, CalendarHandler, ClickTarget, DayCell, EventStyle, MonthGrid};
pub use navigation::MonthCursor;
