use crate::calendar::Clock;
use crate::models::{CalendarEvent, Case, Client, ClientStatus, Document, EventStatus, EventType};
use crate::utils::time::{days_until, parse_start};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

/// How soon a deadline falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AlertPriority {
    /// Due today
    #[serde(rename = "URGENTE")]
    Urgente,
    /// Due within the next 48 hours
    #[serde(rename = "PRÓXIMO")]
    Proximo,
    #[serde(rename = "NORMAL")]
    Normal,
}

impl AlertPriority {
    pub fn for_days_left(days: i64) -> Self {
        match days {
            d if d <= 0 => AlertPriority::Urgente,
            1 | 2 => AlertPriority::Proximo,
            _ => AlertPriority::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertPriority::Urgente => "URGENTE (Hoy)",
            AlertPriority::Proximo => "PRÓXIMO (48h)",
            AlertPriority::Normal => "NORMAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total_cases: usize,
    pub active_clients: usize,
    pub hearings_today: usize,
    /// Deadlines due today
    pub critical_alerts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeadlineAlert {
    pub event_id: String,
    pub case_code: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due: NaiveDate,
    pub priority: AlertPriority,
    pub priority_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingHearing {
    pub event_id: String,
    pub title: String,
    pub date: NaiveDate,
    /// "HH:MM" in the calendar zone
    pub time: String,
    pub location: Option<String>,
    pub judicial_unit: Option<String>,
    pub case_code: Option<String>,
    pub is_today: bool,
}

/// Snapshots the dashboard is derived from
#[derive(Debug, Clone, Copy)]
pub struct DashboardSources<'a> {
    pub clients: &'a [Client],
    pub cases: &'a [Case],
    pub events: &'a [CalendarEvent],
    /// Newest first
    pub documents: &'a [Document],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLimits {
    pub upcoming_hearings: usize,
    pub recent_documents: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub kpis: Kpis,
    pub deadlines: Vec<DeadlineAlert>,
    pub hearings: Vec<UpcomingHearing>,
    pub recent_documents: Vec<Document>,
}

fn pending_of_type<'a>(
    events: &'a [CalendarEvent],
    event_type: EventType,
    tz: Tz,
) -> impl Iterator<Item = (&'a CalendarEvent, DateTime<Tz>)> + 'a {
    events
        .iter()
        .filter(move |e| e.event_type == event_type && e.status == EventStatus::Pendiente)
        .filter_map(move |e| parse_start(&e.start_time, tz).map(|start| (e, start)))
}

impl Dashboard {
    pub fn build(sources: DashboardSources<'_>, clock: &dyn Clock, limits: DashboardLimits) -> Self {
        let tz = clock.timezone();
        let now = clock.now();
        let today = now.date_naive();

        let mut deadlines: Vec<DeadlineAlert> = pending_of_type(sources.events, EventType::Vencimiento, tz)
            .filter(|(_, start)| start.date_naive() >= today)
            .map(|(event, start)| {
                let due = start.date_naive();
                let priority = AlertPriority::for_days_left(days_until(today, due));
                DeadlineAlert {
                    event_id: event.id.clone(),
                    case_code: event.case_code.clone(),
                    title: event.title.clone(),
                    description: event.description.clone(),
                    due,
                    priority,
                    priority_label: priority.label(),
                }
            })
            .collect();
        deadlines.sort_by_key(|d| d.due);

        let mut upcoming: Vec<(&CalendarEvent, DateTime<Tz>)> =
            pending_of_type(sources.events, EventType::Audiencia, tz)
                .filter(|(_, start)| *start >= now)
                .collect();
        upcoming.sort_by_key(|(_, start)| *start);

        let hearings_today = pending_of_type(sources.events, EventType::Audiencia, tz)
            .filter(|(_, start)| start.date_naive() == today)
            .count();

        let hearings = upcoming
            .into_iter()
            .take(limits.upcoming_hearings)
            .map(|(event, start)| {
                let judicial_unit = event.case_id.as_deref().and_then(|id| {
                    sources
                        .cases
                        .iter()
                        .find(|c| c.id == id)
                        .and_then(|c| c.judicial_unit.clone())
                });
                UpcomingHearing {
                    event_id: event.id.clone(),
                    title: event.title.clone(),
                    date: start.date_naive(),
                    time: start.format("%H:%M").to_string(),
                    location: event.location.clone(),
                    judicial_unit,
                    case_code: event.case_code.clone(),
                    is_today: start.date_naive() == today,
                }
            })
            .collect();

        let kpis = Kpis {
            total_cases: sources.cases.len(),
            active_clients: sources
                .clients
                .iter()
                .filter(|c| c.status == ClientStatus::Activo)
                .count(),
            hearings_today,
            critical_alerts: deadlines
                .iter()
                .filter(|d| d.priority == AlertPriority::Urgente)
                .count(),
        };

        Self {
            today,
            kpis,
            deadlines,
            hearings,
            recent_documents: sources
                .documents
                .iter()
                .take(limits.recent_documents)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use chrono::TimeZone;

    const LIMITS: DashboardLimits = DashboardLimits {
        upcoming_hearings: 3,
        recent_documents: 5,
    };

    fn clock() -> FixedClock {
        // 2024-05-15 10:00 in Guayaquil
        let tz = chrono_tz::America::Guayaquil;
        FixedClock::new(tz.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap())
    }

    fn event(id: &str, event_type: EventType, start: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: id.to_string(),
            start_time: start.to_string(),
            event_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_priority_thresholds() {
        assert_eq!(AlertPriority::for_days_left(0), AlertPriority::Urgente);
        assert_eq!(AlertPriority::for_days_left(1), AlertPriority::Proximo);
        assert_eq!(AlertPriority::for_days_left(2), AlertPriority::Proximo);
        assert_eq!(AlertPriority::for_days_left(3), AlertPriority::Normal);
    }

    #[test]
    fn test_deadline_alerts() {
        let mut done = event("hecho", EventType::Vencimiento, "2024-05-15T18:00:00");
        done.status = EventStatus::Realizado;
        let events = vec![
            event("semana", EventType::Vencimiento, "2024-05-22T09:00:00"),
            event("hoy", EventType::Vencimiento, "2024-05-15T08:00:00"),
            event("ayer", EventType::Vencimiento, "2024-05-14T09:00:00"),
            event("manana", EventType::Vencimiento, "2024-05-16T09:00:00"),
            done,
        ];

        let dashboard = Dashboard::build(
            DashboardSources {
                clients: &[],
                cases: &[],
                events: &events,
                documents: &[],
            },
            &clock(),
            LIMITS,
        );

        let alerts: Vec<(&str, AlertPriority)> = dashboard
            .deadlines
            .iter()
            .map(|d| (d.event_id.as_str(), d.priority))
            .collect();
        assert_eq!(
            alerts,
            vec![
                ("hoy", AlertPriority::Urgente),
                ("manana", AlertPriority::Proximo),
                ("semana", AlertPriority::Normal),
            ]
        );
        assert_eq!(dashboard.kpis.critical_alerts, 1);
        assert_eq!(dashboard.deadlines[0].priority_label, "URGENTE (Hoy)");
    }

    #[test]
    fn test_upcoming_hearings_limit_and_today_flag() {
        let cases = vec![Case {
            id: "k1".to_string(),
            client_id: "c1".to_string(),
            judicial_unit: Some("Unidad Judicial Civil de Quito".to_string()),
            ..Default::default()
        }];
        let mut with_case = event("tarde", EventType::Audiencia, "2024-05-15T15:00:00");
        with_case.case_id = Some("k1".to_string());
        let events = vec![
            event("pasada", EventType::Audiencia, "2024-05-15T08:00:00"),
            with_case,
            event("d3", EventType::Audiencia, "2024-05-18T09:00:00"),
            event("d1", EventType::Audiencia, "2024-05-16T09:00:00"),
            event("d2", EventType::Audiencia, "2024-05-17T09:00:00"),
            event("reunion", EventType::Reunion, "2024-05-15T11:00:00"),
        ];

        let dashboard = Dashboard::build(
            DashboardSources {
                clients: &[],
                cases: &cases,
                events: &events,
                documents: &[],
            },
            &clock(),
            LIMITS,
        );

        let ids: Vec<&str> = dashboard.hearings.iter().map(|h| h.event_id.as_str()).collect();
        assert_eq!(ids, vec!["tarde", "d1", "d2"]);
        assert!(dashboard.hearings[0].is_today);
        assert_eq!(dashboard.hearings[0].time, "15:00");
        assert_eq!(
            dashboard.hearings[0].judicial_unit.as_deref(),
            Some("Unidad Judicial Civil de Quito")
        );
        assert!(!dashboard.hearings[1].is_today);
        // The morning hearing already started but still counts for today
        assert_eq!(dashboard.kpis.hearings_today, 2);
    }

    #[test]
    fn test_kpis_and_recent_documents() {
        let clients = vec![
            Client {
                id: "c1".to_string(),
                status: ClientStatus::Activo,
                ..Default::default()
            },
            Client {
                id: "c2".to_string(),
                status: ClientStatus::Prospecto,
                ..Default::default()
            },
        ];
        let cases = vec![Case::default(), Case::default()];
        let documents: Vec<Document> = (0..8)
            .map(|i| Document {
                id: format!("d{}", i),
                ..Default::default()
            })
            .collect();

        let dashboard = Dashboard::build(
            DashboardSources {
                clients: &clients,
                cases: &cases,
                events: &[],
                documents: &documents,
            },
            &clock(),
            LIMITS,
        );

        assert_eq!(dashboard.kpis.total_cases, 2);
        assert_eq!(dashboard.kpis.active_clients, 1);
        assert_eq!(dashboard.recent_documents.len(), 5);
        assert_eq!(dashboard.recent_documents[0].id, "d0");
        assert_eq!(dashboard.today, NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
    }
}
