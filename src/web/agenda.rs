use super::AppState;
use crate::calendar::labels::{month_name, weekday_headers, AgendaLabels};
use crate::calendar::{CalendarAction, ClickTarget, DayCell, EventStyle, MonthCursor, MonthGrid, YearMonth};
use crate::error::{other_error, storage_error, validation_error, DespachoResult, Error};
use crate::services::EventBook;
use crate::utils::time::local_time_label;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Month selector; `month` is 1-based in URLs
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SelectQuery {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Set when an event chip was clicked rather than the day itself
    pub event: Option<String>,
}

/// Resolve the requested month, falling back to the current one for
/// missing parts
fn requested_month(query: &MonthQuery, cursor: &MonthCursor) -> DespachoResult<YearMonth> {
    let current = cursor.current();
    let year = query.year.unwrap_or(current.year());
    let month0 = match query.month {
        Some(month) => month
            .checked_sub(1)
            .ok_or_else(|| validation_error("El mes debe estar entre 1 y 12"))?,
        None => current.month0(),
    };
    YearMonth::new(year, month0).ok_or_else(|| validation_error("Mes fuera de rango"))
}

fn agenda_href(month: YearMonth) -> String {
    format!("/agenda?year={}&month={}", month.year(), month.month0() + 1)
}

pub struct ChipView {
    pub id: String,
    pub title: String,
    pub time: String,
    pub css_class: &'static str,
}

pub struct CellView {
    pub blank: bool,
    pub day: u32,
    pub date: String,
    pub is_today: bool,
    pub events: Vec<ChipView>,
}

#[derive(Template)]
#[template(path = "agenda.html")]
pub struct AgendaTemplate {
    pub lang: String,
    pub labels: AgendaLabels,
    pub month_label: String,
    pub weekdays: [String; 7],
    pub weeks: Vec<Vec<CellView>>,
    pub prev_href: String,
    pub next_href: String,
    pub event_count: usize,
}

impl AgendaTemplate {
    pub fn from_grid(grid: &MonthGrid<'_>, state: &AppState) -> Self {
        let locale = state.locale();
        let tz = state.tz();
        let month = grid.month();

        let prev = MonthCursor::at(month).go_to_previous_month();
        let next = MonthCursor::at(month).go_to_next_month();

        let weeks = grid
            .weeks()
            .map(|week| {
                week.iter()
                    .map(|cell| match cell {
                        DayCell::Blank => CellView {
                            blank: true,
                            day: 0,
                            date: String::new(),
                            is_today: false,
                            events: Vec::new(),
                        },
                        DayCell::Day {
                            day,
                            date,
                            is_today,
                            events,
                        } => CellView {
                            blank: false,
                            day: *day,
                            date: date.format("%Y-%m-%d").to_string(),
                            is_today: *is_today,
                            events: events
                                .iter()
                                .map(|event| ChipView {
                                    id: event.id.clone(),
                                    title: event.title.clone(),
                                    time: local_time_label(&event.start_time, tz).unwrap_or_default(),
                                    css_class: EventStyle::of(event.event_type).css_class(),
                                })
                                .collect(),
                        },
                    })
                    .collect()
            })
            .collect();

        Self {
            lang: locale.to_string(),
            labels: AgendaLabels::for_locale(locale),
            month_label: format!("{} {}", month_name(month.month0(), locale), month.year()),
            weekdays: weekday_headers(locale),
            weeks,
            prev_href: agenda_href(prev),
            next_href: agenda_href(next),
            event_count: grid.event_count(),
        }
    }
}

async fn load_events(state: &AppState) -> DespachoResult<EventBook> {
    let book = EventBook::load(state.store.clone(), state.tz()).await;
    match book.error() {
        Some(message) => Err(storage_error(message)),
        None => Ok(book),
    }
}

/// Month view page
pub async fn agenda_handler(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> DespachoResult<Html<String>> {
    let cursor = MonthCursor::new(state.clock.as_ref());
    let month = requested_month(&query, &cursor)?;

    let book = load_events(&state).await?;
    let grid = MonthGrid::build(month, book.events(), state.clock.as_ref());

    AgendaTemplate::from_grid(&grid, &state)
        .render()
        .map(Html)
        .map_err(|e| other_error(&format!("Template render error: {}", e)))
}

/// Event chip activation
pub async fn event_click_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DespachoResult<Json<CalendarAction>> {
    let book = load_events(&state).await?;
    let event = book.find(&id).cloned().ok_or(Error::NotFound {
        table: "events",
        id,
    })?;
    Ok(Json(CalendarAction::EventSelected { event }))
}

/// Day cell activation; defaults to today
pub async fn date_click_handler(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Json<CalendarAction> {
    let date = query.date.unwrap_or_else(|| state.clock.today());
    Json(CalendarAction::DateSelected { date })
}

/// Resolve a click inside a month grid
pub async fn select_handler(
    State(state): State<AppState>,
    Query(query): Query<SelectQuery>,
) -> DespachoResult<Json<CalendarAction>> {
    let cursor = MonthCursor::new(state.clock.as_ref());
    let month = requested_month(
        &MonthQuery {
            year: Some(query.year),
            month: Some(query.month),
        },
        &cursor,
    )?;

    let book = load_events(&state).await?;
    let grid = MonthGrid::build(month, book.events(), state.clock.as_ref());

    let target = match query.event {
        Some(event_id) => ClickTarget::Event {
            day: query.day,
            event_id,
        },
        None => ClickTarget::Day(query.day),
    };

    let mut actions: Vec<CalendarAction> = Vec::new();
    if !grid.activate(&target, &mut actions) {
        return Err(Error::NotFound {
            table: "calendar",
            id: format!("{}-{:02}", month, query.day),
        });
    }
    actions
        .pop()
        .map(Json)
        .ok_or_else(|| other_error("Activation produced no action"))
}
