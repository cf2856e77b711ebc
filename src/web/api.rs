use super::AppState;
use crate::error::{storage_error, validation_error, DespachoResult, Error};
use crate::models::{
    CalendarEvent, Case, Client, CurrentUser, Document, LawyerAccount, NewCase, NewClient, NewEvent,
    UserPreferences,
};
use crate::services::{
    CaseBook, ClientBook, Dashboard, DashboardSources, DocumentBook, EventBook, SettingsService,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CaseFilter {
    pub case_id: Option<String>,
}

/// Turn a failed book fetch into an error
fn fetched(error: Option<&str>) -> DespachoResult<()> {
    match error {
        Some(message) => Err(storage_error(message)),
        None => Ok(()),
    }
}

fn search_term(query: &SearchQuery) -> Option<&str> {
    query.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
}

pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> DespachoResult<Json<Vec<Client>>> {
    let book = ClientBook::load(state.store.clone()).await;
    fetched(book.error())?;

    let clients = match search_term(&query) {
        Some(term) => book.search(term).into_iter().cloned().collect(),
        None => book.clients().to_vec(),
    };
    Ok(Json(clients))
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(client): Json<NewClient>,
) -> DespachoResult<impl IntoResponse> {
    let mut book = ClientBook::new(state.store.clone());
    let client = book.add(client).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut client): Json<Client>,
) -> DespachoResult<Json<Client>> {
    client.id = id;
    let mut book = ClientBook::new(state.store.clone());
    book.update(client.clone()).await?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DespachoResult<StatusCode> {
    ClientBook::new(state.store.clone()).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_cases(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> DespachoResult<Json<Vec<Case>>> {
    let book = CaseBook::load(state.store.clone()).await;
    fetched(book.error())?;

    let cases = match search_term(&query) {
        Some(term) => book.search(term).into_iter().cloned().collect(),
        None => book.cases().to_vec(),
    };
    Ok(Json(cases))
}

pub async fn create_case(
    State(state): State<AppState>,
    Json(case): Json<NewCase>,
) -> DespachoResult<impl IntoResponse> {
    let mut book = CaseBook::new(state.store.clone());
    let case = book.add(case).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

pub async fn update_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut case): Json<Case>,
) -> DespachoResult<Json<Case>> {
    case.id = id;
    let mut book = CaseBook::new(state.store.clone());
    book.update(&case).await?;
    let updated = book.find(&case.id).cloned().unwrap_or(case);
    Ok(Json(updated))
}

pub async fn delete_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DespachoResult<StatusCode> {
    CaseBook::new(state.store.clone()).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<CaseFilter>,
) -> DespachoResult<Json<Vec<CalendarEvent>>> {
    let book = EventBook::load(state.store.clone(), state.tz()).await;
    fetched(book.error())?;

    let events = match filter.case_id.as_deref() {
        Some(case_id) => book.for_case(case_id).into_iter().cloned().collect(),
        None => book.events().to_vec(),
    };
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(event): Json<NewEvent>,
) -> DespachoResult<impl IntoResponse> {
    let mut book = EventBook::new(state.store.clone(), state.tz());
    let event = book.add(event).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut event): Json<CalendarEvent>,
) -> DespachoResult<Json<CalendarEvent>> {
    event.id = id;
    let mut book = EventBook::new(state.store.clone(), state.tz());
    book.update(&event).await?;
    let updated = book.find(&event.id).cloned().unwrap_or(event);
    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DespachoResult<StatusCode> {
    EventBook::new(state.store.clone(), state.tz()).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn document_book(state: &AppState) -> DespachoResult<DocumentBook> {
    let book = DocumentBook::load(state.store.clone(), state.storage.clone(), state.link_ttl()?).await;
    fetched(book.error())?;
    Ok(book)
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(filter): Query<CaseFilter>,
) -> DespachoResult<Json<Vec<Document>>> {
    let book = document_book(&state).await?;
    let documents = match filter.case_id.as_deref() {
        Some(case_id) => book.for_case(case_id).into_iter().cloned().collect(),
        None => book.documents().to_vec(),
    };
    Ok(Json(documents))
}

/// Multipart upload: a `file` part plus optional `case_id` and `client_id`
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> DespachoResult<impl IntoResponse> {
    let mut file = None;
    let mut case_id = None;
    let mut client_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation_error(&format!("Invalid upload: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| validation_error(&format!("Invalid upload: {}", e)))?;
                file = Some((file_name, content_type, bytes));
            }
            "case_id" => {
                case_id = field.text().await.ok();
            }
            "client_id" => {
                client_id = field.text().await.ok();
            }
            _ => {}
        }
    }

    let Some((file_name, content_type, bytes)) = file else {
        return Err(validation_error("Falta el archivo"));
    };

    let mut book = DocumentBook::new(state.store.clone(), state.storage.clone(), state.link_ttl()?);
    let document = book
        .upload(&file_name, &bytes, &content_type, case_id, client_id, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DespachoResult<StatusCode> {
    let mut book = document_book(&state).await?;
    let file_path = book
        .find(&id)
        .map(|d| d.file_path.clone())
        .ok_or_else(|| Error::NotFound {
            table: "documents",
            id: id.clone(),
        })?;
    book.delete(&id, &file_path).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Signed download link for a document
pub async fn document_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DespachoResult<Json<serde_json::Value>> {
    let book = document_book(&state).await?;
    let not_found = || Error::NotFound {
        table: "documents",
        id: id.clone(),
    };

    let document = book.find(&id).ok_or_else(not_found)?;
    let url = book
        .download_url(&document.file_path)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(json!({ "url": url })))
}

fn content_type_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Serve the file behind a signed token
pub async fn download_file(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> DespachoResult<impl IntoResponse> {
    let opened = state.storage.open_signed(&token).await?;
    let Some((path, bytes)) = opened else {
        return Err(Error::NotFound {
            table: "files",
            id: token,
        });
    };
    info!("Serving file {}", path);
    Ok(([(header::CONTENT_TYPE, content_type_for(&path))], bytes))
}

pub async fn dashboard(State(state): State<AppState>) -> DespachoResult<Json<Dashboard>> {
    let store = state.store.clone();
    let clients = ClientBook::load(store.clone()).await;
    fetched(clients.error())?;
    let cases = CaseBook::load(store.clone()).await;
    fetched(cases.error())?;
    let events = EventBook::load(store, state.tz()).await;
    fetched(events.error())?;
    let documents = document_book(&state).await?;

    let dashboard = Dashboard::build(
        DashboardSources {
            clients: clients.clients(),
            cases: cases.cases(),
            events: events.events(),
            documents: documents.documents(),
        },
        state.clock.as_ref(),
        state.dashboard_limits(),
    );
    Ok(Json(dashboard))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> DespachoResult<Json<LawyerAccount>> {
    let service = SettingsService::new(state.store.clone());
    Ok(Json(service.account(&id).await?))
}

pub async fn save_account(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(mut account): Json<LawyerAccount>,
) -> DespachoResult<Json<LawyerAccount>> {
    account.id = id;
    let service = SettingsService::new(state.store.clone());
    Ok(Json(service.save_account(&user, account).await?))
}

pub async fn get_preferences(
    State(state): State<AppState>,
    Path((user_id, account_id)): Path<(String, String)>,
) -> DespachoResult<Json<UserPreferences>> {
    let service = SettingsService::new(state.store.clone());
    Ok(Json(service.preferences(&user_id, &account_id).await?))
}

pub async fn save_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((user_id, account_id)): Path<(String, String)>,
    Json(mut preferences): Json<UserPreferences>,
) -> DespachoResult<Json<UserPreferences>> {
    preferences.user_id = user_id;
    preferences.account_id = account_id;
    let service = SettingsService::new(state.store.clone());
    Ok(Json(service.save_preferences(&user, preferences).await?))
}
