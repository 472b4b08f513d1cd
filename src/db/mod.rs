//! Database layer.
//!
//! [`Store`] is the persistence seam. [`FirestoreDb`] backs production;
//! [`MemoryStore`] backs local development and the test suite.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Project, Session, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const SESSIONS: &str = "user_sessions";
    pub const PROJECTS: &str = "projects";
}

/// Upper bound on projects returned by a listing.
pub const MAX_PROJECTS_PER_LIST: u32 = 100;

/// In-place edit of a project document. Returning an error aborts the
/// write and leaves the stored document untouched.
pub type ProjectMutation<'a> = &'a (dyn Fn(&mut Project) -> Result<(), AppError> + Send + Sync);

/// Document store operations used by the services.
///
/// Project operations take the owner and treat a project owned by someone
/// else exactly like a missing one.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Look up a user by normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;

    // ─── Sessions ────────────────────────────────────────────────
    async fn create_session(&self, session: &Session) -> Result<(), AppError>;

    async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError>;

    async fn delete_session(&self, token: &str) -> Result<(), AppError>;

    /// Delete every session whose expiry is at or before `now`.
    /// Returns the number deleted.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, AppError>;

    // ─── Projects ────────────────────────────────────────────────
    /// Projects owned by `owner`, oldest first, at most `limit`.
    async fn list_projects(&self, owner: &str, limit: u32) -> Result<Vec<Project>, AppError>;

    async fn insert_project(&self, project: &Project) -> Result<(), AppError>;

    async fn get_project(&self, owner: &str, project_id: &str)
        -> Result<Option<Project>, AppError>;

    /// Atomically read, mutate and write back one owned project.
    /// Returns `None` if no such project is owned by `owner`.
    async fn modify_project(
        &self,
        owner: &str,
        project_id: &str,
        mutation: ProjectMutation<'_>,
    ) -> Result<Option<Project>, AppError>;

    /// Returns `false` if no such project is owned by `owner`.
    async fn delete_project(&self, owner: &str, project_id: &str) -> Result<bool, AppError>;
}
