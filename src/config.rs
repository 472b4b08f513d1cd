//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. The allow-lists are immutable afterwards and are
//! handed to the services that need them.

use std::env;
use std::time::Duration;

const DEFAULT_IDENTITY_SESSION_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";
const DEFAULT_LLM_ENDPOINT: &str = "https://api.emergentagent.com/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash-lite";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "STORAGE_BACKEND must be 'firestore' or 'memory', got '{other}'"
            ))),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL (CORS origin, cookie policy)
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Document store backend
    pub storage: StorageBackend,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,

    // --- Authorization ---
    /// Exact emails allowed to sign in
    pub allowed_emails: Vec<String>,
    /// Email domains allowed to sign in
    pub allowed_domains: Vec<String>,

    // --- Upstream services ---
    /// Identity provider endpoint that resolves one-time session ids
    pub identity_session_url: String,
    /// Timeout applied to every outbound call
    pub upstream_timeout: Duration,
    /// Advisory text provider key. `None` disables the advisory endpoint.
    pub llm_api_key: Option<String>,
    /// OpenAI-compatible chat completions endpoint
    pub llm_endpoint: String,
    pub llm_model: String,

    /// Interval for the expired-session sweep. `None` disables it.
    pub session_sweep_interval: Option<Duration>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            allowed_emails: vec!["owner@example.com".to_string()],
            allowed_domains: vec!["longhornsolar.com".to_string()],
            identity_session_url: "http://127.0.0.1:1/session-data".to_string(),
            upstream_timeout: Duration::from_secs(2),
            llm_api_key: None,
            llm_endpoint: "http://127.0.0.1:1/v1/chat/completions".to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            session_sweep_interval: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let upstream_timeout_secs = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) => parse_secs("UPSTREAM_TIMEOUT_SECS", &raw)?,
            Err(_) => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        let session_sweep_interval = env::var("SESSION_SWEEP_INTERVAL_SECS")
            .ok()
            .map(|raw| parse_secs("SESSION_SWEEP_INTERVAL_SECS", &raw))
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),

            allowed_emails: split_list(&env::var("ALLOWED_EMAILS").unwrap_or_default()),
            allowed_domains: split_list(
                &env::var("ALLOWED_DOMAINS").unwrap_or_else(|_| "longhornsolar.com".to_string()),
            ),

            identity_session_url: env::var("IDENTITY_SESSION_URL")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_SESSION_URL.to_string()),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            llm_api_key: env::var("LLM_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            llm_endpoint: env::var("LLM_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_LLM_ENDPOINT.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),

            session_sweep_interval,
        })
    }

    /// Whether the frontend is served from a local development origin.
    pub fn is_local_frontend(&self) -> bool {
        self.frontend_url.starts_with("http://localhost")
            || self.frontend_url.starts_with("http://127.0.0.1")
    }
}

/// Split a comma-separated list, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_secs(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a whole number of seconds")))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
