// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider bridge: exchanges a one-time session id for a verified
//! identity and the provider-issued bearer token.

use crate::config::Config;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

const SESSION_ID_HEADER: &str = "X-Session-ID";

/// Verified identity returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    /// Opaque bearer value stored verbatim as the session key.
    pub session_token: String,
}

/// Identity provider errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider answered with a non-success status.
    #[error("identity provider returned status {0}")]
    Rejected(u16),

    /// The request never produced a usable response.
    #[error("identity provider request failed: {0}")]
    Transport(String),

    /// The response body was not a usable identity.
    #[error("invalid identity provider response: {0}")]
    InvalidResponse(String),
}

/// Resolves one-time session ids. One round trip per call, no retries.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_session(&self, session_id: &str) -> Result<ProviderSession, IdentityError>;
}

/// HTTP client for the hosted identity provider.
pub struct HttpIdentityProvider {
    http_client: reqwest::Client,
    session_url: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .context("failed building identity provider HTTP client")?;

        tracing::info!(
            session_url = %config.identity_session_url,
            timeout_secs = config.upstream_timeout.as_secs(),
            "Initialized identity provider client"
        );

        Ok(Self {
            http_client,
            session_url: config.identity_session_url.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_session(&self, session_id: &str) -> Result<ProviderSession, IdentityError> {
        let response = self
            .http_client
            .get(&self.session_url)
            .header(SESSION_ID_HEADER, session_id)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected(status.as_u16()));
        }

        let session: ProviderSession = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        if session.session_token.trim().is_empty() {
            return Err(IdentityError::InvalidResponse(
                "missing session_token".to_string(),
            ));
        }

        Ok(session)
    }
}
