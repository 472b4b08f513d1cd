// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store for local development and tests.
//!
//! Each project mutation runs while holding the entry's shard lock, which
//! gives the same single-document atomicity the Firestore backend gets
//! from a transaction.

use crate::db::{ProjectMutation, Store};
use crate::error::AppError;
use crate::models::{Project, Session, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Process-local document store.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    sessions: DashMap<String, Session>,
    projects: DashMap<String, Project>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of stored sessions, expired ones included.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        self.sessions
            .insert(session.session_token.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.sessions.get(token).map(|s| s.clone()))
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        self.sessions.remove(token);
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.is_valid_at(now));
        Ok(before.saturating_sub(self.sessions.len()))
    }

    async fn list_projects(&self, owner: &str, limit: u32) -> Result<Vec<Project>, AppError> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.user_id == owner)
            .map(|p| p.clone())
            .collect();

        projects.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.project_id.cmp(&b.project_id))
        });
        projects.truncate(limit as usize);
        Ok(projects)
    }

    async fn insert_project(&self, project: &Project) -> Result<(), AppError> {
        self.projects
            .insert(project.project_id.clone(), project.clone());
        Ok(())
    }

    async fn get_project(
        &self,
        owner: &str,
        project_id: &str,
    ) -> Result<Option<Project>, AppError> {
        Ok(self
            .projects
            .get(project_id)
            .filter(|p| p.user_id == owner)
            .map(|p| p.clone()))
    }

    async fn modify_project(
        &self,
        owner: &str,
        project_id: &str,
        mutation: ProjectMutation<'_>,
    ) -> Result<Option<Project>, AppError> {
        let Some(mut entry) = self.projects.get_mut(project_id) else {
            return Ok(None);
        };
        if entry.user_id != owner {
            return Ok(None);
        }

        // Mutate a copy so a failed mutation leaves the stored document untouched
        let mut updated = entry.clone();
        mutation(&mut updated)?;
        *entry = updated.clone();

        Ok(Some(updated))
    }

    async fn delete_project(&self, owner: &str, project_id: &str) -> Result<bool, AppError> {
        Ok(self
            .projects
            .remove_if(project_id, |_, p| p.user_id == owner)
            .is_some())
    }
}
