use serde::{Deserialize, Deserializer, Serialize};

/// Kind of agenda entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Court hearing
    Audiencia,
    /// Meeting
    Reunion,
    /// Filing deadline
    Vencimiento,
    /// To-do
    #[default]
    Tarea,
    /// Any type string this build does not know about
    #[serde(other)]
    Otro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Pendiente,
    Realizado,
    Cancelado,
    /// Any status string this build does not know about
    #[serde(other)]
    Desconocido,
}

/// Agenda entry as stored, plus the joined case code and client name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw timestamp; the only field used to place the event on the calendar.
    /// Null or missing reads as empty and the event is never placed.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub case_code: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub lawyer_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Insert payload for a new agenda entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub lawyer_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Fields an update is allowed to touch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventChanges {
    pub title: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: Option<String>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub status: EventStatus,
    pub case_id: Option<String>,
    pub client_id: Option<String>,
    pub location: Option<String>,
}

impl From<&CalendarEvent> for EventChanges {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start_time: event.start_time.clone(),
            end_time: event.end_time.clone(),
            event_type: event.event_type,
            status: event.status,
            // Blank relations are cleared rather than stored as ""
            case_id: non_blank(&event.case_id),
            client_id: non_blank(&event.client_id),
            location: event.location.clone(),
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_falls_back_to_otro() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"id":"e1","title":"Peritaje","start_time":"2024-05-15T10:00","type":"peritaje","status":"pendiente"}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, EventType::Otro);
    }

    #[test]
    fn test_unknown_status_and_null_start_still_decode() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"id":"e2","title":"Diligencia","start_time":"2024-05-15T10:00","status":"en_progreso"}"#,
        )
        .unwrap();
        assert_eq!(event.status, EventStatus::Desconocido);

        let event: CalendarEvent =
            serde_json::from_str(r#"{"id":"e3","title":null,"start_time":null}"#).unwrap();
        assert_eq!(event.start_time, "");
        assert_eq!(event.title, "");

        let event: CalendarEvent = serde_json::from_str(r#"{"id":"e4"}"#).unwrap();
        assert_eq!(event.start_time, "");
    }

    #[test]
    fn test_known_types_round_trip_names() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"id":"e1","title":"Audiencia preliminar","start_time":"2024-05-15T10:00","type":"audiencia","status":"realizado"}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, EventType::Audiencia);
        assert_eq!(event.status, EventStatus::Realizado);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "audiencia");
        assert_eq!(value["status"], "realizado");
    }

    #[test]
    fn test_changes_clear_blank_relations() {
        let event = CalendarEvent {
            id: "e1".to_string(),
            title: "Reunión".to_string(),
            start_time: "2024-05-15T10:00".to_string(),
            case_id: Some("".to_string()),
            client_id: Some("c1".to_string()),
            case_code: Some("17231-2023-0045".to_string()),
            ..Default::default()
        };
        let changes = EventChanges::from(&event);
        assert_eq!(changes.case_id, None);
        assert_eq!(changes.client_id.as_deref(), Some("c1"));

        // Joined fields never reach the store
        let value = serde_json::to_value(&changes).unwrap();
        assert!(value.get("case_code").is_none());
        assert!(value.get("id").is_none());
    }
}
