// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava link and sync endpoints.
//!
//! Both operations require a valid bearer token (applied in routes/mod.rs);
//! every failure below comes back as the `{error: string}` envelope via
//! `AppError::into_response`.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{body::Bytes, extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/strava/link", post(link))
        .route("/strava/sync", post(sync))
}

/// Request body for linking a Strava account.
#[derive(Deserialize)]
pub struct LinkRequest {
    #[serde(default)]
    code: Option<String>,
}

/// Response after a successful link.
#[derive(Serialize)]
pub struct LinkResponse {
    pub connected: bool,
    #[serde(rename = "athleteId")]
    pub athlete_id: u64,
}

/// Link the authenticated user's account to Strava.
async fn link(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Json<LinkResponse>> {
    // Parsed leniently so a missing or malformed body reports the same
    // missing-field error instead of a framework rejection.
    let code = serde_json::from_slice::<LinkRequest>(&body)
        .ok()
        .and_then(|req| req.code)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing required field: code".to_string()))?;

    let outcome = state.link_service.link(&user.user_id, &code).await?;

    Ok(Json(LinkResponse {
        connected: true,
        athlete_id: outcome.athlete_id,
    }))
}

/// Response after a sync run.
#[derive(Serialize)]
pub struct SyncResponse {
    pub synced: u32,
    pub total: u32,
}

/// Sync the authenticated user's recent Strava activities.
async fn sync(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SyncResponse>> {
    let report = state.sync_service.sync(&user.user_id).await?;

    Ok(Json(SyncResponse {
        synced: report.synced,
        total: report.total,
    }))
}
