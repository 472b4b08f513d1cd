// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod project;
pub mod user;

pub use project::{
    BidItem, BidPatch, Bids, DetailValue, Details, NewProject, Project, ProjectPatch, SiteAddress,
};
pub use user::{Session, User};
