// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Project repository and bid update engine.
//!
//! Every operation is scoped by the authenticated owner. A project owned by
//! another user is reported as `NotFound`, exactly like a missing one.

use crate::db::{Store, MAX_PROJECTS_PER_LIST};
use crate::error::AppError;
use crate::models::project::DEFAULT_STATUS;
use crate::models::{BidPatch, Bids, NewProject, Project, ProjectPatch};
use crate::services::catalog::ServiceCatalog;
use chrono::Utc;
use std::sync::Arc;

/// Owner-scoped CRUD over projects and their embedded bids.
#[derive(Clone)]
pub struct ProjectService {
    db: Arc<dyn Store>,
    catalog: Arc<ServiceCatalog>,
}

fn generate_project_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("proj_{}", &hex[..12])
}

fn project_not_found(project_id: &str) -> AppError {
    AppError::NotFound(format!("Project {} not found", project_id))
}

impl ProjectService {
    pub fn new(db: Arc<dyn Store>, catalog: Arc<ServiceCatalog>) -> Self {
        Self { db, catalog }
    }

    /// Restore catalog order; storage backends do not preserve map order.
    fn in_catalog_order(&self, mut project: Project) -> Project {
        project.bids.sort_by_rank(|name| self.catalog.rank(name));
        project
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Project>, AppError> {
        let projects = self.db.list_projects(owner, MAX_PROJECTS_PER_LIST).await?;
        Ok(projects
            .into_iter()
            .map(|p| self.in_catalog_order(p))
            .collect())
    }

    /// Create a project with one zero-valued bid per catalog service.
    pub async fn create(&self, owner: &str, new_project: NewProject) -> Result<Project, AppError> {
        let now = Utc::now();
        let project = Project {
            project_id: generate_project_id(),
            user_id: owner.to_string(),
            bids: Bids::for_services(self.catalog.names()),
            client_name: new_project.client_name,
            project_date: now.date_naive(),
            status: DEFAULT_STATUS.to_string(),
            site_address: new_project.site_address.unwrap_or_default(),
            phone_number: new_project.phone_number.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.db.insert_project(&project).await?;

        tracing::info!(
            project_id = %project.project_id,
            user_id = %owner,
            bids = project.bids.len(),
            "Project created"
        );

        Ok(project)
    }

    pub async fn get(&self, owner: &str, project_id: &str) -> Result<Project, AppError> {
        self.db
            .get_project(owner, project_id)
            .await?
            .map(|p| self.in_catalog_order(p))
            .ok_or_else(|| project_not_found(project_id))
    }

    /// Apply the supplied metadata fields and refresh `updated_at`.
    pub async fn update(
        &self,
        owner: &str,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> Result<Project, AppError> {
        let updated = self
            .db
            .modify_project(owner, project_id, &|project| {
                patch.apply_to(project);
                project.updated_at = Utc::now();
                Ok(())
            })
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        tracing::info!(project_id = %project_id, user_id = %owner, "Project updated");

        Ok(self.in_catalog_order(updated))
    }

    /// Remove a project together with all of its bids.
    pub async fn delete(&self, owner: &str, project_id: &str) -> Result<(), AppError> {
        if !self.db.delete_project(owner, project_id).await? {
            return Err(project_not_found(project_id));
        }

        tracing::info!(project_id = %project_id, user_id = %owner, "Project deleted");
        Ok(())
    }

    /// Apply the supplied fields to one bid and refresh the project's
    /// `updated_at`.
    ///
    /// The set of bid keys is fixed when the project is created, so a
    /// service name the project has no bid for is `NotFound`.
    pub async fn update_bid(
        &self,
        owner: &str,
        project_id: &str,
        service_name: &str,
        patch: &BidPatch,
    ) -> Result<Project, AppError> {
        let updated = self
            .db
            .modify_project(owner, project_id, &|project| {
                let bid = project.bids.get_mut(service_name).ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Bid {} not found in project {}",
                        service_name, project_id
                    ))
                })?;
                patch.apply_to(bid);
                project.updated_at = Utc::now();
                Ok(())
            })
            .await?
            .ok_or_else(|| project_not_found(project_id))?;

        tracing::info!(
            project_id = %project_id,
            user_id = %owner,
            service = %service_name,
            "Bid updated"
        );

        Ok(self.in_catalog_order(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{BidItem, SiteAddress};

    fn service() -> ProjectService {
        ProjectService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(ServiceCatalog::default()),
        )
    }

    fn new_project(name: &str) -> NewProject {
        NewProject {
            client_name: name.to_string(),
            phone_number: None,
            site_address: None,
        }
    }

    #[tokio::test]
    async fn test_create_populates_catalog_bids() {
        let svc = service();
        let project = svc.create("user_a", new_project("Test Client")).await.unwrap();

        assert!(project.project_id.starts_with("proj_"));
        assert_eq!(project.status, "QUOTING");
        assert_eq!(project.site_address, SiteAddress::default());
        assert_eq!(project.phone_number, "");
        assert_eq!(project.project_date, project.created_at.date_naive());

        let catalog = ServiceCatalog::default();
        let fetched = svc.get("user_a", &project.project_id).await.unwrap();
        assert!(fetched.bids.names().eq(catalog.names()));
        for bid in fetched.bids.iter() {
            assert_eq!(bid, &BidItem::empty(bid.service_name.clone()));
        }
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let svc = service();
        let project = svc.create("user_a", new_project("A's client")).await.unwrap();
        let id = project.project_id.as_str();

        assert!(matches!(svc.get("user_b", id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            svc.update("user_b", id, &ProjectPatch::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.update_bid("user_b", id, "Solar", &BidPatch::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(svc.delete("user_b", id).await, Err(AppError::NotFound(_))));

        // Still intact for the owner
        assert!(svc.get("user_a", id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_bid_is_idempotent() {
        let svc = service();
        let project = svc.create("user_a", new_project("Client")).await.unwrap();
        let patch = BidPatch {
            selected: Some(true),
            est_cost: Some(25000.0),
            ..Default::default()
        };

        let once = svc
            .update_bid("user_a", &project.project_id, "Solar", &patch)
            .await
            .unwrap();
        let twice = svc
            .update_bid("user_a", &project.project_id, "Solar", &patch)
            .await
            .unwrap();

        assert_eq!(once.bids, twice.bids);
        assert!(twice.updated_at >= once.updated_at);
        assert!(once.updated_at >= project.updated_at);
    }

    #[tokio::test]
    async fn test_unknown_bid_is_rejected_without_writing() {
        let svc = service();
        let project = svc.create("user_a", new_project("Client")).await.unwrap();

        let err = svc
            .update_bid(
                "user_a",
                &project.project_id,
                "Hot Tub",
                &BidPatch {
                    selected: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let fetched = svc.get("user_a", &project.project_id).await.unwrap();
        assert!(fetched.bids.get("Hot Tub").is_none());
        assert_eq!(fetched.updated_at, project.updated_at);
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let svc = service();
        let project = svc.create("user_a", new_project("Client")).await.unwrap();

        svc.delete("user_a", &project.project_id).await.unwrap();
        assert!(matches!(
            svc.get("user_a", &project.project_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete("user_a", &project.project_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_stable() {
        let svc = service();
        let a1 = svc.create("user_a", new_project("One")).await.unwrap();
        let a2 = svc.create("user_a", new_project("Two")).await.unwrap();
        svc.create("user_b", new_project("Other")).await.unwrap();

        let first: Vec<String> = svc
            .list("user_a")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.project_id)
            .collect();
        let second: Vec<String> = svc
            .list("user_a")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.project_id)
            .collect();

        assert_eq!(first.len(), 2);
        assert!(first.contains(&a1.project_id) && first.contains(&a2.project_id));
        assert_eq!(first, second);
    }
}
