//! Mocked authentication. Every request runs as one configured user.

use super::AppState;
use crate::models::{CurrentUser, Role};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::env;

/// User from `MOCK_USER_ID`, `MOCK_USER_NAME` and `MOCK_ROLE`
/// (`ADMIN_ROLE` unless set to `USER_ROLE`)
pub fn mock_user() -> CurrentUser {
    let role = match env::var("MOCK_ROLE").as_deref() {
        Ok("USER_ROLE") => Role::User,
        _ => Role::Admin,
    };
    CurrentUser {
        id: env::var("MOCK_USER_ID").unwrap_or_else(|_| "mock-admin".to_string()),
        name: env::var("MOCK_USER_NAME").unwrap_or_else(|_| "Dr. Moreno".to_string()),
        role,
    }
}

/// Attach the current user to the request
pub async fn inject_user(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(state.user.clone());
    next.run(req).await
}
