// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session exchange, current-user and logout routes.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{extract_session_token, removal_cookie, session_cookie, AuthUser};
use crate::models::User;
use crate::routes::ValidatedJson;
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/session", post(create_session))
        .route("/api/auth/logout", post(logout))
}

/// Routes mounted behind `require_auth`.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/me", get(get_me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SessionRequest {
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionUserResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Exchange a one-time session id for a session cookie.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<SessionRequest>,
) -> Result<(CookieJar, Json<SessionUserResponse>)> {
    let session_id = body
        .session_id
        .ok_or_else(|| AppError::MissingInput("session_id required".to_string()))?;

    let exchanged = state.sessions.exchange(&session_id).await?;
    let user = exchanged.user;

    let jar = jar.add(session_cookie(&state.config, exchanged.session_token));

    Ok((
        jar,
        Json(SessionUserResponse {
            user_id: user.user_id,
            email: user.email,
            name: user.name,
            picture: user.picture,
        }),
    ))
}

/// Current user profile.
async fn get_me(Extension(AuthUser(user)): Extension<AuthUser>) -> Json<User> {
    Json(user)
}

/// Delete the caller's session, if any, and clear the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    if let Some(token) = extract_session_token(&jar, &headers) {
        state.sessions.logout(&token).await?;
        tracing::info!("Session logged out");
    }

    let jar = jar.add(removal_cookie(&state.config));

    Ok((jar, Json(MessageResponse::new("Logged out successfully"))))
}
