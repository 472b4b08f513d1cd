// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Project and bid routes. Mounted behind `require_auth`.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{BidPatch, NewProject, Project, ProjectPatch};
use crate::routes::auth::MessageResponse;
use crate::routes::ValidatedJson;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{project_id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route(
            "/api/projects/{project_id}/bids/{service_name}",
            put(update_bid),
        )
}

async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.projects.list(&user.user_id).await?))
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<NewProject>,
) -> Result<(StatusCode, Json<Project>)> {
    let project = state.projects.create(&user.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>> {
    Ok(Json(state.projects.get(&user.user_id, &project_id).await?))
}

async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(project_id): Path<String>,
    ValidatedJson(patch): ValidatedJson<ProjectPatch>,
) -> Result<Json<Project>> {
    let project = state
        .projects
        .update(&user.user_id, &project_id, &patch)
        .await?;
    Ok(Json(project))
}

async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.projects.delete(&user.user_id, &project_id).await?;
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}

/// Partial update of one bid, addressed by service name.
async fn update_bid(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path((project_id, service_name)): Path<(String, String)>,
    ValidatedJson(patch): ValidatedJson<BidPatch>,
) -> Result<Json<MessageResponse>> {
    state
        .projects
        .update_bid(&user.user_id, &project_id, &service_name, &patch)
        .await?;
    Ok(Json(MessageResponse::new("Bid updated successfully")))
}
