// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Energy Estimator: project quoting backend for a home energy-efficiency contractor.
//!
//! This crate provides the backend API for allow-listed users to manage client
//! projects, the per-service bids inside them, and AI-generated advisory copy.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{AdvisoryGenerator, ProjectService, ServiceCatalog, SessionService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<ServiceCatalog>,
    pub sessions: SessionService,
    pub projects: ProjectService,
    pub advisory: AdvisoryGenerator,
}
