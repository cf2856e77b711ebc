#![cfg(feature = "web-interface")]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use despacho::calendar::FixedClock;
use despacho::config::Config;
use despacho::models::{CurrentUser, Role};
use despacho::store::{InMemoryStore, LocalObjectStorage};
use despacho::web::{router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn app(role: Role) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();
    let storage = LocalObjectStorage::new(dir.path(), &config.public_url).unwrap();
    let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(), chrono_tz::UTC);

    let state = AppState::new(
        config,
        Arc::new(InMemoryStore::new()),
        Arc::new(storage),
        Arc::new(clock),
    )
    .with_user(CurrentUser {
        id: "u-1".to_string(),
        name: "Dr. Moreno".to_string(),
        role,
    });
    (router(state), dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = app(Role::Admin);
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_agenda_page_places_events() {
    let (app, _dir) = app(Role::Admin);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(json!({"title": "Audiencia preliminar", "start_time": "2024-05-15T11:30:00Z", "type": "audiencia"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, "/agenda?year=2024&month=5", None).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("data-events=\"1\""));
    assert!(html.contains("Audiencia preliminar"));
    // Previous and next links, whatever the ampersand escaping
    assert!(html.contains("month=4\""));
    assert!(html.contains("month=6\""));

    let (status, _) = send(&app, Method::GET, "/agenda?year=2024&month=13", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_client_create_and_search() {
    let (app, _dir) = app(Role::Admin);
    for (name, identification) in [("Ana Torres", "0912345678"), ("Bruno Díaz", "1790012345001")] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/clients",
            Some(json!({"name": name, "identification": identification})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json_body(&body)["name"], name);
    }

    let (status, body) = send(&app, Method::GET, "/api/clients?q=ana", None).await;
    assert_eq!(status, StatusCode::OK);
    let found = json_body(&body);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "Ana Torres");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/clients",
        Some(json!({"name": " ", "identification": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(&body)["error"].is_string());
}

#[tokio::test]
async fn test_unknown_rows_are_not_found() {
    let (app, _dir) = app(Role::Admin);
    let (status, _) = send(&app, Method::GET, "/agenda/events/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/files/not-a-token", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/settings/account/acc-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_select_day_and_event() {
    let (app, _dir) = app(Role::Admin);
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(json!({"title": "Reunión", "start_time": "2024-05-20T15:00:00Z", "type": "reunion"})),
    )
    .await;
    let id = json_body(&body)["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/agenda/select?year=2024&month=5&day=20", None).await;
    assert_eq!(status, StatusCode::OK);
    let action = json_body(&body);
    assert_eq!(action["action"], "date_selected");
    assert_eq!(action["date"], "2024-05-20");

    let uri = format!("/agenda/select?year=2024&month=5&day=20&event={}", id);
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let action = json_body(&body);
    assert_eq!(action["action"], "event_selected");
    assert_eq!(action["event"]["id"], id.as_str());

    // Day 31 does not exist in a 30-day month
    let (status, _) = send(&app, Method::GET, "/agenda/select?year=2024&month=6&day=31", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/agenda/new", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["date"], "2024-05-15");
}

#[tokio::test]
async fn test_regular_user_cannot_change_account() {
    let (app, _dir) = app(Role::User);
    let account = json!({
        "id": "acc-1",
        "organizationId": "org-1",
        "fullName": "Estudio Moreno",
        "professionalId": "17-2010-123",
        "billingConfig": {"type": "HOURLY", "currency": "USD"},
        "dataRetention": {"policy": "SOFT_DELETE"}
    });
    let (status, _) = send(&app, Method::PUT, "/api/settings/account/acc-1", Some(account)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_dashboard_counts() {
    let (app, _dir) = app(Role::Admin);
    send(
        &app,
        Method::POST,
        "/api/events",
        Some(json!({"title": "Vence apelación", "start_time": "2024-05-15T17:00:00Z", "type": "vencimiento"})),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let dashboard = json_body(&body);
    assert_eq!(dashboard["kpis"]["critical_alerts"], 1);
    assert_eq!(dashboard["deadlines"][0]["priority"], "URGENTE");
}
