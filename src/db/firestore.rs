// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Sessions (bearer tokens keyed by URL-encoded token)
//! - Projects (one document per project, bids embedded)

use crate::db::{collections, ProjectMutation, Store};
use crate::error::AppError;
use crate::models::{Project, Session, User};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Attempts for a project read-check-write before giving up on contention.
const MAX_COMMIT_ATTEMPTS: u32 = 5;
const COMMIT_RETRY_BASE: Duration = Duration::from_millis(50);

/// Result of one transactional attempt.
enum Commit<T> {
    Done(T),
    /// Firestore aborted the commit; safe to rerun.
    Contended(String),
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

/// Session document IDs are URL-encoded so arbitrary provider tokens
/// (which may contain `/`) are valid Firestore IDs.
fn session_doc_id(token: &str) -> String {
    urlencoding::encode(token).into_owned()
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Read a project inside `transaction` so concurrent writers conflict.
    async fn read_project_in_transaction(
        &self,
        transaction: &firestore::FirestoreTransaction<'_>,
        project_id: &str,
    ) -> Result<Option<Project>, AppError> {
        let reader = self.client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        reader
            .fluent()
            .select()
            .by_id_in(collections::PROJECTS)
            .obj()
            .one(project_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read project in transaction: {}", e))
            })
    }

    async fn modify_project_once(
        &self,
        owner: &str,
        project_id: &str,
        mutation: ProjectMutation<'_>,
    ) -> Result<Commit<Option<Project>>, AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current = self
            .read_project_in_transaction(&transaction, project_id)
            .await?;

        let Some(mut project) = current.filter(|p| p.user_id == owner) else {
            let _ = transaction.rollback().await;
            return Ok(Commit::Done(None));
        };

        if let Err(e) = mutation(&mut project) {
            let _ = transaction.rollback().await;
            return Err(e);
        }

        self.client
            .fluent()
            .update()
            .in_col(collections::PROJECTS)
            .document_id(project_id)
            .object(&project)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add project to transaction: {}", e))
            })?;

        match transaction.commit().await {
            Ok(_) => Ok(Commit::Done(Some(project))),
            Err(firestore::errors::FirestoreError::DatabaseError(e)) if e.retry_possible => {
                Ok(Commit::Contended(e.to_string()))
            }
            Err(e) => Err(AppError::Database(format!("Transaction commit failed: {}", e))),
        }
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                self.client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl Store for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Session Operations ──────────────────────────────────────

    async fn create_session(&self, session: &Session) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::SESSIONS)
            .document_id(session_doc_id(&session.session_token))
            .object(session)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::SESSIONS)
            .obj()
            .one(&session_doc_id(token))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::SESSIONS)
            .document_id(session_doc_id(token))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let cutoff = format_utc_rfc3339(now);

        let candidates: Vec<Session> = self
            .client
            .fluent()
            .select()
            .from(collections::SESSIONS)
            .filter(|q| q.for_all([q.field("expires_at").less_than_or_equal(cutoff.as_str())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // The string comparison is only a prefilter; re-check with parsed instants.
        let expired: Vec<Session> = candidates
            .into_iter()
            .filter(|s| !s.is_valid_at(now))
            .collect();

        self.batch_delete(&expired, collections::SESSIONS, |s: &Session| {
            session_doc_id(&s.session_token)
        })
        .await?;

        Ok(expired.len())
    }

    // ─── Project Operations ──────────────────────────────────────

    async fn list_projects(&self, owner: &str, limit: u32) -> Result<Vec<Project>, AppError> {
        let mut projects: Vec<Project> = self
            .client
            .fluent()
            .select()
            .from(collections::PROJECTS)
            .filter(|q| q.for_all([q.field("user_id").eq(owner)]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Ascending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Same-instant creations tie-break on id so the order is stable
        projects.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.project_id.cmp(&b.project_id))
        });
        Ok(projects)
    }

    async fn insert_project(&self, project: &Project) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::PROJECTS)
            .document_id(&project.project_id)
            .object(project)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_project(
        &self,
        owner: &str,
        project_id: &str,
    ) -> Result<Option<Project>, AppError> {
        let project: Option<Project> = self
            .client
            .fluent()
            .select()
            .by_id_in(collections::PROJECTS)
            .obj()
            .one(project_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(project.filter(|p| p.user_id == owner))
    }

    /// Read-check-write of one project inside a Firestore transaction.
    ///
    /// A commit that loses a race with another writer to the same document
    /// is aborted by Firestore; the whole read-check-write then reruns
    /// against the newer document.
    async fn modify_project(
        &self,
        owner: &str,
        project_id: &str,
        mutation: ProjectMutation<'_>,
    ) -> Result<Option<Project>, AppError> {
        let mut attempt = 1;
        loop {
            match self.modify_project_once(owner, project_id, mutation).await? {
                Commit::Done(project) => return Ok(project),
                Commit::Contended(reason) if attempt < MAX_COMMIT_ATTEMPTS => {
                    tracing::warn!(project_id, attempt, %reason, "Project commit contended, retrying");
                    tokio::time::sleep(COMMIT_RETRY_BASE * attempt).await;
                    attempt += 1;
                }
                Commit::Contended(reason) => {
                    return Err(AppError::Database(format!(
                        "Transaction commit failed after {attempt} attempts: {reason}"
                    )));
                }
            }
        }
    }

    async fn delete_project(&self, owner: &str, project_id: &str) -> Result<bool, AppError> {
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let owned = self
            .read_project_in_transaction(&transaction, project_id)
            .await?
            .is_some_and(|p| p.user_id == owner);

        if !owned {
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        self.client
            .fluent()
            .delete()
            .from(collections::PROJECTS)
            .document_id(project_id)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add deletion to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(true)
    }
}
