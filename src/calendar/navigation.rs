use super::clock::Clock;
use super::dates::YearMonth;

/// Which month the calendar is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    current: YearMonth,
}

impl MonthCursor {
    /// Start at the clock's current month
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            current: YearMonth::from_date(clock.today()),
        }
    }

    pub fn at(month: YearMonth) -> Self {
        Self { current: month }
    }

    pub fn current(&self) -> YearMonth {
        self.current
    }

    pub fn year(&self) -> i32 {
        self.current.year()
    }

    pub fn month0(&self) -> u32 {
        self.current.month0()
    }

    pub fn go_to_previous_month(&mut self) -> YearMonth {
        self.current = self.current.pred();
        self.current
    }

    pub fn go_to_next_month(&mut self) -> YearMonth {
        self.current = self.current.succ();
        self.current
    }
}
