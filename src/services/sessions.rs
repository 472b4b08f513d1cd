// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: exchange, lookup-time validation, logout and sweep.

use crate::db::Store;
use crate::error::AppError;
use crate::models::user::normalize_email;
use crate::models::{Session, User};
use crate::services::authorization::AccessPolicy;
use crate::services::identity::IdentityProvider;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Session lifetime from creation.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Result of a successful exchange.
#[derive(Debug, Clone)]
pub struct ExchangedSession {
    pub user: User,
    pub session_token: String,
}

/// Owns session creation and validation.
#[derive(Clone)]
pub struct SessionService {
    db: Arc<dyn Store>,
    identity: Arc<dyn IdentityProvider>,
    policy: Arc<AccessPolicy>,
}

fn generate_user_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("user_{}", &hex[..12])
}

impl SessionService {
    pub fn new(
        db: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            db,
            identity,
            policy,
        }
    }

    /// Exchange a one-time session id for a stored session.
    ///
    /// Nothing is written unless the provider accepts the id and the email
    /// passes the allow-list.
    pub async fn exchange(&self, session_id: &str) -> Result<ExchangedSession, AppError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(AppError::MissingInput("session_id required".to_string()));
        }

        let identity = self
            .identity
            .fetch_session(session_id)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Identity provider rejected session exchange");
                AppError::UpstreamAuth(e.to_string())
            })?;

        let email = normalize_email(&identity.email);
        if !self.policy.is_authorized(&email) {
            tracing::warn!(email = %email, "Rejected sign-in for email not on allow-list");
            return Err(AppError::Forbidden(format!(
                "Email '{}' is not authorized.",
                identity.email
            )));
        }

        let now = Utc::now();
        let user = match self.db.find_user_by_email(&email).await? {
            Some(mut existing) => {
                existing.name = identity.name;
                existing.picture = identity.picture;
                existing
            }
            None => User {
                user_id: generate_user_id(),
                email,
                name: identity.name,
                picture: identity.picture,
                created_at: now,
            },
        };
        self.db.upsert_user(&user).await?;

        let session = Session {
            session_token: identity.session_token,
            user_id: user.user_id.clone(),
            expires_at: format_utc_rfc3339(now + Duration::days(SESSION_TTL_DAYS)),
            created_at: format_utc_rfc3339(now),
        };
        self.db.create_session(&session).await?;

        tracing::info!(user_id = %user.user_id, email = %user.email, "Session created");

        Ok(ExchangedSession {
            user,
            session_token: session.session_token,
        })
    }

    /// Resolve a bearer token to its user as of now.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        self.authenticate_at(token, Utc::now()).await
    }

    /// Resolve a bearer token to its user as of `now`. Performs no writes;
    /// expired sessions stay in the store until logout or the sweep.
    pub async fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<User, AppError> {
        let session = self
            .db
            .get_session(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !session.is_valid_at(now) {
            tracing::debug!(user_id = %session.user_id, "Rejected expired session");
            return Err(AppError::SessionExpired);
        }

        match self.db.get_user(&session.user_id).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = %session.user_id, "Session refers to a missing user");
                Err(AppError::Unauthorized)
            }
        }
    }

    /// Delete the session for `token`, if any.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.db.delete_session(token).await
    }

    /// Remove sessions that expired at or before `now`.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let removed = self.db.delete_expired_sessions(now).await?;
        tracing::info!(removed, "Expired session sweep complete");
        Ok(removed)
    }

    /// Run the sweep forever on a fixed interval.
    pub async fn run_sweep_loop(self, interval: std::time::Duration) {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = self.sweep_expired(Utc::now()).await {
                tracing::warn!(error = %e, "Expired session sweep failed");
            }
        }
    }
}
