use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Source of the current date and time, in the zone the calendar renders in
pub trait Clock: Send + Sync {
    /// Current instant in the calendar's zone
    fn now(&self) -> DateTime<Tz>;

    /// Zone used to turn event timestamps into calendar dates
    fn timezone(&self) -> Tz {
        self.now().timezone()
    }

    /// Current calendar date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Tz>,
}

impl FixedClock {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self { now }
    }

    /// Noon of `date` in `tz`
    pub fn at_date(date: NaiveDate, tz: Tz) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        let now = tz
            .from_local_datetime(&noon)
            .earliest()
            .unwrap_or_else(|| noon.and_utc().with_timezone(&tz));
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.now
    }
}
