//! User and session models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::parse_utc_lenient;

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier (also used as document ID)
    pub user_id: String,
    /// Email address, trimmed and lower-cased
    pub email: String,
    /// Display name
    pub name: String,
    /// Profile picture URL
    pub picture: Option<String>,
    /// When the user first signed in
    pub created_at: DateTime<Utc>,
}

/// Session record keyed by the provider-issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token (document ID is its URL-encoded form)
    pub session_token: String,
    /// Owning user
    pub user_id: String,
    /// Absolute expiry (ISO 8601; values without offset are UTC)
    pub expires_at: String,
    /// When the session was created (ISO 8601)
    pub created_at: String,
}

impl Session {
    /// Expiry as an absolute instant, if it parses.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_utc_lenient(&self.expires_at)
    }

    /// A session is valid only while its expiry is strictly in the future.
    /// Unparseable expiries are never valid.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at_utc().is_some_and(|expires| expires > now)
    }
}

/// Normalize an email for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
