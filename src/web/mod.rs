//! HTTP surface: the agenda page, JSON endpoints for every record book and
//! signed file downloads.

use crate::calendar::Clock;
use crate::config::Config;
use crate::error::DespachoResult;
use crate::models::CurrentUser;
use crate::services::DashboardLimits;
use crate::store::{ObjectStorage, Store};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, put},
    Router,
};
use chrono_tz::Tz;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod agenda;
pub mod api;
pub mod auth;
pub mod error;

/// Upload size limit for documents
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Record storage
    pub store: Arc<dyn Store>,
    /// Document file storage
    pub storage: Arc<dyn ObjectStorage>,
    pub clock: Arc<dyn Clock>,
    /// User injected into every request until real authentication exists
    pub user: CurrentUser,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        storage: Arc<dyn ObjectStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            storage,
            clock,
            user: auth::mock_user(),
        }
    }

    pub fn with_user(mut self, user: CurrentUser) -> Self {
        self.user = user;
        self
    }

    pub fn tz(&self) -> Tz {
        self.clock.timezone()
    }

    pub fn locale(&self) -> &str {
        &self.config.locale
    }

    pub fn link_ttl(&self) -> DespachoResult<chrono::Duration> {
        let secs = i64::try_from(self.config.signed_url_ttl_secs)
            .map_err(|_| crate::error::config_error("SIGNED_URL_TTL_SECS is too large"))?;
        chrono::Duration::try_seconds(secs)
            .ok_or_else(|| crate::error::config_error("SIGNED_URL_TTL_SECS is too large"))
    }

    pub fn dashboard_limits(&self) -> DashboardLimits {
        DashboardLimits {
            upcoming_hearings: self.config.upcoming_hearings_limit,
            recent_documents: self.config.recent_documents_limit,
        }
    }
}

/// Health check
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/agenda", get(agenda::agenda_handler))
        .route("/agenda/events/{id}", get(agenda::event_click_handler))
        .route("/agenda/new", get(agenda::date_click_handler))
        .route("/agenda/select", get(agenda::select_handler))
        .route("/api/clients", get(api::list_clients).post(api::create_client))
        .route("/api/clients/{id}", put(api::update_client).delete(api::delete_client))
        .route("/api/cases", get(api::list_cases).post(api::create_case))
        .route("/api/cases/{id}", put(api::update_case).delete(api::delete_case))
        .route("/api/events", get(api::list_events).post(api::create_event))
        .route("/api/events/{id}", put(api::update_event).delete(api::delete_event))
        .route("/api/documents", get(api::list_documents).post(api::upload_document))
        .route("/api/documents/{id}", axum::routing::delete(api::delete_document))
        .route("/api/documents/{id}/url", get(api::document_url))
        .route("/files/{token}", get(api::download_file))
        .route("/api/dashboard", get(api::dashboard))
        .route(
            "/api/settings/account/{id}",
            get(api::get_account).put(api::save_account),
        )
        .route(
            "/api/settings/preferences/{user}/{account}",
            get(api::get_preferences).put(api::save_preferences),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth::inject_user))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
