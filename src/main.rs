// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Energy Estimator API Server
//!
//! Project quoting backend for a residential energy-efficiency contractor:
//! allow-listed crew members manage client projects and their per-service bids.

use energy_estimator::{
    config::{Config, StorageBackend},
    db::{FirestoreDb, MemoryStore, Store},
    services::{
        AccessPolicy, AdvisoryGenerator, HttpIdentityProvider, ProjectService, ServiceCatalog,
        SessionService,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Energy Estimator API");

    // Initialize document store
    let db: Arc<dyn Store> = match config.storage {
        StorageBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.allowed_emails.is_empty() && config.allowed_domains.is_empty() {
        tracing::warn!("Allow-list is empty; every sign-in will be rejected");
    }
    let policy = Arc::new(AccessPolicy::new(
        &config.allowed_emails,
        &config.allowed_domains,
    ));
    tracing::info!(
        emails = config.allowed_emails.len(),
        domains = ?config.allowed_domains,
        "Access policy loaded"
    );

    let identity = Arc::new(HttpIdentityProvider::new(&config)?);
    let catalog = Arc::new(ServiceCatalog::default());
    tracing::info!(count = catalog.services().len(), "Service catalog loaded");

    let sessions = SessionService::new(db.clone(), identity, policy);
    let projects = ProjectService::new(db, catalog.clone());
    let advisory = AdvisoryGenerator::new(&config)?;

    if let Some(interval) = config.session_sweep_interval {
        tracing::info!(interval_secs = interval.as_secs(), "Expired session sweep enabled");
        tokio::spawn(sessions.clone().run_sweep_loop(interval));
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        catalog,
        sessions,
        projects,
        advisory,
    });

    // Build router
    let app = energy_estimator::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,energy_estimator=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
