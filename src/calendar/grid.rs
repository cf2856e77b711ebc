use super::bucket::bucketize;
use super::clock::Clock;
use super::dates::YearMonth;
use crate::models::{CalendarEvent, EventType};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;

/// Visual category of an event chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStyle {
    Hearing,
    Meeting,
    Deadline,
    Other,
}

impl EventStyle {
    /// Category for an event type; anything without its own style is `Other`
    pub fn of(event_type: EventType) -> Self {
        match event_type {
            EventType::Audiencia => EventStyle::Hearing,
            EventType::Reunion => EventStyle::Meeting,
            EventType::Vencimiento => EventStyle::Deadline,
            EventType::Tarea | EventType::Otro => EventStyle::Other,
        }
    }

    /// CSS class applied to the chip
    pub fn css_class(&self) -> &'static str {
        match self {
            EventStyle::Hearing => "event-hearing",
            EventStyle::Meeting => "event-meeting",
            EventStyle::Deadline => "event-deadline",
            EventStyle::Other => "event-other",
        }
    }
}

/// One square of the month grid
#[derive(Debug, Clone, PartialEq)]
pub enum DayCell<'a> {
    /// Padding before day 1
    Blank,
    Day {
        day: u32,
        date: NaiveDate,
        is_today: bool,
        events: Vec<&'a CalendarEvent>,
    },
}

impl<'a> DayCell<'a> {
    pub fn is_blank(&self) -> bool {
        matches!(self, DayCell::Blank)
    }

    pub fn day_number(&self) -> Option<u32> {
        match self {
            DayCell::Blank => None,
            DayCell::Day { day, .. } => Some(*day),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DayCell::Blank => None,
            DayCell::Day { date, .. } => Some(*date),
        }
    }

    pub fn is_today(&self) -> bool {
        matches!(self, DayCell::Day { is_today: true, .. })
    }

    pub fn events(&self) -> &[&'a CalendarEvent] {
        match self {
            DayCell::Blank => &[],
            DayCell::Day { events, .. } => events,
        }
    }
}

/// Where a user clicked inside the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// Empty area of a numbered day
    Day(u32),
    /// An event chip inside a day
    Event { day: u32, event_id: String },
}

/// Receiver of grid activations
pub trait CalendarHandler {
    fn on_event_click(&mut self, event: &CalendarEvent);

    fn on_date_click(&mut self, _date: NaiveDate) {}
}

/// Activation outcome, for callers that prefer values over callbacks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CalendarAction {
    EventSelected { event: CalendarEvent },
    DateSelected { date: NaiveDate },
}

impl CalendarHandler for Vec<CalendarAction> {
    fn on_event_click(&mut self, event: &CalendarEvent) {
        self.push(CalendarAction::EventSelected {
            event: event.clone(),
        });
    }

    fn on_date_click(&mut self, date: NaiveDate) {
        self.push(CalendarAction::DateSelected { date });
    }
}

/// Month view: leading blanks followed by one cell per day
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid<'a> {
    month: YearMonth,
    cells: Vec<DayCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Build the grid for `month`, reading today's date and the zone from `clock`
    pub fn build(month: YearMonth, events: &'a [CalendarEvent], clock: &dyn Clock) -> Self {
        Self::build_for(month, events, clock.today(), clock.timezone())
    }

    /// Build the grid with an explicit today and zone
    pub fn build_for(month: YearMonth, events: &'a [CalendarEvent], today: NaiveDate, tz: Tz) -> Self {
        let leading_blanks = month.first_weekday();
        let days = month.days_in_month();
        let mut buckets = bucketize(events, month, tz);

        let mut cells = Vec::with_capacity((leading_blanks + days) as usize);
        cells.extend((0..leading_blanks).map(|_| DayCell::Blank));

        for day in 1..=days {
            let Some(date) = month.day(day) else {
                continue;
            };
            cells.push(DayCell::Day {
                day,
                date,
                is_today: date == today,
                events: buckets.remove(&day).unwrap_or_default(),
            });
        }

        Self { month, cells }
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn cells(&self) -> &[DayCell<'a>] {
        &self.cells
    }

    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_blank()).count()
    }

    /// Cell for day-of-month `day`
    pub fn day(&self, day: u32) -> Option<&DayCell<'a>> {
        self.cells.iter().find(|c| c.day_number() == Some(day))
    }

    /// Rows of seven cells, the last one possibly shorter
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell<'a>]> {
        self.cells.chunks(7)
    }

    /// Events placed anywhere in the grid
    pub fn event_count(&self) -> usize {
        self.cells.iter().map(|c| c.events().len()).sum()
    }

    /// Dispatch a click. An event click reaches only `on_event_click`, never
    /// the surrounding day's `on_date_click`. Returns false when the target
    /// does not exist in this grid.
    pub fn activate(&self, target: &ClickTarget, handler: &mut impl CalendarHandler) -> bool {
        match target {
            ClickTarget::Event { day, event_id } => {
                let event = self
                    .day(*day)
                    .and_then(|cell| cell.events().iter().find(|e| e.id == *event_id));
                match event {
                    Some(event) => {
                        handler.on_event_click(event);
                        true
                    }
                    None => false,
                }
            }
            ClickTarget::Day(day) => match self.day(*day).and_then(DayCell::date) {
                Some(date) => {
                    handler.on_date_click(date);
                    true
                }
                None => false,
            },
        }
    }
}
