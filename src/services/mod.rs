// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod advisory;
pub mod authorization;
pub mod catalog;
pub mod identity;
pub mod projects;
pub mod sessions;

pub use advisory::{AdvisoryGenerator, AdvisoryRequest};
pub use authorization::AccessPolicy;
pub use catalog::{CatalogService, ServiceCatalog};
pub use identity::{HttpIdentityProvider, IdentityError, IdentityProvider, ProviderSession};
pub use projects::ProjectService;
pub use sessions::{ExchangedSession, SessionService};
