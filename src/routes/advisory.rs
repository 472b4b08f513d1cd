// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Advisory text route. Mounted behind `require_auth`.

use crate::error::Result;
use crate::routes::ValidatedJson;
use crate::services::AdvisoryRequest;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/ai/recommendations", post(get_recommendations))
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: String,
}

/// Always 200 once configured; provider failures come back as fallback text.
async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<AdvisoryRequest>,
) -> Result<Json<RecommendationsResponse>> {
    let recommendations = state.advisory.generate(&request).await?;

    Ok(Json(RecommendationsResponse { recommendations }))
}
