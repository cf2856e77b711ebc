use crate::error::{validation_error, DespachoResult};
use crate::models::{Case, CalendarEvent, Client, EventChanges, NewEvent};
use crate::store::{Store, Table};
use crate::utils::time::parse_start;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Agenda entries ordered by start time, with case code and client name joined
pub struct EventBook {
    store: Arc<dyn Store>,
    tz: Tz,
    events: Vec<CalendarEvent>,
    error: Option<String>,
}

impl EventBook {
    /// `tz` is the zone start times are read in for ordering
    pub fn new(store: Arc<dyn Store>, tz: Tz) -> Self {
        Self {
            store,
            tz,
            events: Vec::new(),
            error: None,
        }
    }

    pub async fn load(store: Arc<dyn Store>, tz: Tz) -> Self {
        let mut book = Self::new(store, tz);
        book.refresh().await;
        book
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find(&self, id: &str) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub async fn refresh(&mut self) {
        match self.fetch().await {
            Ok(events) => {
                self.events = events;
                self.error = None;
            }
            Err(e) => {
                error!("Error fetching events: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    async fn fetch(&self) -> DespachoResult<Vec<CalendarEvent>> {
        let mut events: Vec<CalendarEvent> = self.store.select_as(Table::Events).await?;
        let cases: Vec<Case> = self.store.select_as(Table::Cases).await?;
        let clients: Vec<Client> = self.store.select_as(Table::Clients).await?;

        let codes: HashMap<&str, Option<&String>> = cases
            .iter()
            .map(|c| (c.id.as_str(), c.code.as_ref()))
            .collect();
        let names: HashMap<&str, &str> = clients
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        for event in &mut events {
            event.case_code = event
                .case_id
                .as_deref()
                .and_then(|id| codes.get(id).copied().flatten())
                .cloned();
            event.client_name = event
                .client_id
                .as_deref()
                .and_then(|id| names.get(id))
                .map(|name| name.to_string());
        }

        let tz = self.tz;
        // None sorts before Some, so flip the key to keep unparseable ones last
        events.sort_by_cached_key(|e| {
            let start = parse_start(&e.start_time, tz);
            (start.is_none(), start)
        });
        Ok(events)
    }

    pub async fn add(&mut self, event: NewEvent) -> DespachoResult<CalendarEvent> {
        if event.title.trim().is_empty() || event.start_time.trim().is_empty() {
            return Err(validation_error("Título y fecha de inicio son obligatorios"));
        }

        let stored: CalendarEvent = self.store.insert_as(Table::Events, &event).await?;
        info!("Added event {} on {}", stored.id, stored.start_time);

        self.refresh().await;
        Ok(self.find(&stored.id).cloned().unwrap_or(stored))
    }

    pub async fn update(&mut self, event: &CalendarEvent) -> DespachoResult<()> {
        if event.title.trim().is_empty() || event.start_time.trim().is_empty() {
            return Err(validation_error("Título y fecha de inicio son obligatorios"));
        }

        self.store
            .update_with(Table::Events, &event.id, &EventChanges::from(event))
            .await?;
        info!("Updated event {}", event.id);

        self.refresh().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> DespachoResult<()> {
        self.store.delete(Table::Events, id).await?;
        info!("Deleted event {}", id);
        self.events.retain(|e| e.id != id);
        Ok(())
    }

    /// Events linked to one case
    pub fn for_case(&self, case_id: &str) -> Vec<&CalendarEvent> {
        self.events
            .iter()
            .filter(|e| e.case_id.as_deref() == Some(case_id))
            .collect()
    }
}
