use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A displayed month: calendar year plus zero-based month index (0 = January).
///
/// Always backed by a valid first-of-month date, so every derived quantity is
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "YearMonthParts", into = "YearMonthParts")]
pub struct YearMonth {
    first: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct YearMonthParts {
    year: i32,
    month: u32,
}

impl TryFrom<YearMonthParts> for YearMonth {
    type Error = String;

    fn try_from(parts: YearMonthParts) -> Result<Self, Self::Error> {
        YearMonth::new(parts.year, parts.month)
            .ok_or_else(|| format!("invalid month {}-{}", parts.year, parts.month))
    }
}

impl From<YearMonth> for YearMonthParts {
    fn from(ym: YearMonth) -> Self {
        Self {
            year: ym.year(),
            month: ym.month0(),
        }
    }
}

impl YearMonth {
    /// Month `month0` (0..=11) of `year`; `None` outside that range or outside
    /// the representable calendar
    pub fn new(year: i32, month0: u32) -> Option<Self> {
        if month0 > 11 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month0 + 1, 1).map(|first| Self { first })
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// Zero-based month index
    pub fn month0(&self) -> u32 {
        self.first.month0()
    }

    /// Date of `day` within this month, if that day exists
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    /// Whether `date` falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month0() == self.month0()
    }

    /// The month after this one, rolling December into January of the next
    /// year. Saturates at the end of the representable calendar.
    pub fn succ(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// The month before this one, rolling January into December of the
    /// previous year. Saturates at the start of the representable calendar.
    pub fn pred(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// Number of days in this month
    pub fn days_in_month(&self) -> u32 {
        days_in_month(*self)
    }

    /// Weekday index of day 1, 0 = Sunday
    pub fn first_weekday(&self) -> u32 {
        first_weekday_of_month(*self)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month0() + 1)
    }
}

/// Days in the month, taken as the day number of "day 0 of the next month",
/// i.e. the day before the next month's first day.
pub fn days_in_month(month: YearMonth) -> u32 {
    match month.first.checked_add_months(Months::new(1)) {
        Some(next_first) => next_first.pred_opt().map(|last| last.day()).unwrap_or(31),
        // Only December of the last representable year lands here
        None => 31,
    }
}

/// Weekday index (0 = Sunday .. 6 = Saturday) of day 1 of the month
pub fn first_weekday_of_month(month: YearMonth) -> u32 {
    month.first.weekday().num_days_from_sunday()
}

/// Gregorian leap-year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
