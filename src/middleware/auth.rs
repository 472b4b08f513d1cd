// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::services::sessions::SESSION_TTL_DAYS;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

/// Authenticated user resolved from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Find the session token: cookie first, then `Authorization: Bearer`.
pub fn extract_session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Cross-site frontends need `SameSite=None; Secure`. Local development runs
/// over plain HTTP where browsers drop `Secure` cookies.
fn apply_cookie_policy(cookie: &mut Cookie<'static>, config: &Config) {
    cookie.set_path("/");
    cookie.set_http_only(true);
    if config.is_local_frontend() {
        cookie.set_same_site(SameSite::Lax);
        cookie.set_secure(false);
    } else {
        cookie.set_same_site(SameSite::None);
        cookie.set_secure(true);
    }
}

/// Cookie that stores a freshly issued session token.
pub fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    apply_cookie_policy(&mut cookie, config);
    cookie.set_max_age(time::Duration::days(SESSION_TTL_DAYS));
    cookie
}

/// Cookie that tells the browser to drop the session token.
pub fn removal_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    apply_cookie_policy(&mut cookie, config);
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// Middleware that requires a valid, unexpired session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token =
        extract_session_token(&jar, request.headers()).ok_or(AppError::Unauthorized)?;

    let user = state.sessions.authenticate(&token).await.map_err(|e| {
        if e.is_unauthenticated() {
            tracing::debug!(reason = %e, path = %request.uri().path(), "Rejected request");
        }
        e
    })?;

    request.extensions_mut().insert(AuthUser(user));

    Ok(next.run(request).await)
}
