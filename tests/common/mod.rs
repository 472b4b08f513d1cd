// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use energy_estimator::config::Config;
use energy_estimator::db::{FirestoreDb, MemoryStore};
use energy_estimator::routes::create_router;
use energy_estimator::services::{
    AccessPolicy, AdvisoryGenerator, IdentityError, IdentityProvider, ProjectService,
    ProviderSession, ServiceCatalog, SessionService,
};
use energy_estimator::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Identity provider that knows a fixed set of one-time session ids.
pub struct StubIdentityProvider {
    sessions: HashMap<String, ProviderSession>,
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn fetch_session(&self, session_id: &str) -> Result<ProviderSession, IdentityError> {
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or(IdentityError::Rejected(401))
    }
}

fn provider_session(email: &str, name: &str, token: &str) -> ProviderSession {
    ProviderSession {
        email: email.to_string(),
        name: name.to_string(),
        picture: Some(format!("https://example.com/{token}.png")),
        session_token: token.to_string(),
    }
}

/// One-time ids the stub provider accepts, with the token each one yields.
pub const CREW_LOGIN: &str = "crew-login";
pub const CREW_TOKEN: &str = "tok_crew";
#[allow(dead_code)]
pub const OWNER_LOGIN: &str = "owner-login";
#[allow(dead_code)]
pub const OWNER_TOKEN: &str = "tok_owner";
#[allow(dead_code)]
pub const OTHER_LOGIN: &str = "other-login";
#[allow(dead_code)]
pub const OTHER_TOKEN: &str = "tok_other";
#[allow(dead_code)]
pub const STRANGER_LOGIN: &str = "stranger-login";

fn stub_identity() -> StubIdentityProvider {
    let sessions = [
        (
            CREW_LOGIN,
            provider_session("crew@longhornsolar.com", "Crew Member", CREW_TOKEN),
        ),
        (
            OWNER_LOGIN,
            provider_session("Owner@Example.com", "Owner", OWNER_TOKEN),
        ),
        (
            OTHER_LOGIN,
            provider_session("other@longhornsolar.com", "Other Crew", OTHER_TOKEN),
        ),
        (
            STRANGER_LOGIN,
            provider_session("stranger@random.com", "Stranger", "tok_stranger"),
        ),
    ]
    .into_iter()
    .map(|(id, session)| (id.to_string(), session))
    .collect();

    StubIdentityProvider { sessions }
}

/// Test harness: router, shared state and the backing store.
pub struct TestApp {
    pub router: Router,
    #[allow(dead_code)]
    pub state: Arc<AppState>,
    #[allow(dead_code)]
    pub store: Arc<MemoryStore>,
}

/// Create a test app with in-memory storage and a stub identity provider.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(ServiceCatalog::default());
    let policy = Arc::new(AccessPolicy::new(
        &config.allowed_emails,
        &config.allowed_domains,
    ));

    let sessions = SessionService::new(store.clone(), Arc::new(stub_identity()), policy);
    let projects = ProjectService::new(store.clone(), catalog.clone());
    let advisory = AdvisoryGenerator::new(&config).expect("advisory client");

    let state = Arc::new(AppState {
        config,
        catalog,
        sessions,
        projects,
        advisory,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
    }
}

/// Build a request with an optional bearer token and JSON body.
#[allow(dead_code)]
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values on a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Exchange a one-time id and return the issued session token.
#[allow(dead_code)]
pub async fn sign_in(app: &Router, session_id: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/session",
            None,
            Some(serde_json::json!({ "session_id": session_id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie_headers(&response)
        .into_iter()
        .find(|c| c.starts_with("session_token="))
        .expect("session cookie");
    cookie
        .trim_start_matches("session_token=")
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Create a project and return its JSON.
#[allow(dead_code)]
pub async fn create_project(app: &Router, token: &str, client_name: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/projects",
            Some(token),
            Some(serde_json::json!({ "clientName": client_name })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
