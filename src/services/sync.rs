// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity sync: refresh the credential if needed, fetch the recent window
//! from Strava, and reconcile it into the store.
//!
//! Upserts run one at a time so error aggregation stays deterministic; the
//! store's keyed upsert serializes concurrent writers for the same activity.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::db::Store;
use crate::error::AppError;
use crate::models::activity::average_pace_secs_per_km;
use crate::models::{Activity, Credential};
use crate::services::strava::{StravaActivitySummary, StravaApi};

/// Sync lookback window.
const LOOKBACK_DAYS: i64 = 90;
/// Single page; activities beyond this inside the window are not retrieved.
const PAGE_SIZE: u32 = 100;
/// Failure messages sampled for the log beyond the first.
const FAILURE_SAMPLE_LIMIT: usize = 5;

/// Source tag written to every synced activity.
const SOURCE_STRAVA: &str = "strava";

/// Pulls the recent Strava activity window into the store.
#[derive(Clone)]
pub struct SyncService {
    api: Arc<dyn StravaApi>,
    store: Arc<dyn Store>,
}

impl SyncService {
    pub fn new(api: Arc<dyn StravaApi>, store: Arc<dyn Store>) -> Self {
        Self { api, store }
    }

    /// Sync the user's recent activities.
    pub async fn sync(&self, user_id: &str) -> Result<SyncReport, AppError> {
        let credential = self
            .store
            .get_credential(user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Strava account not connected".to_string()))?;

        let access_token = self.ensure_fresh_token(credential).await?;

        let after = (Utc::now() - Duration::days(LOOKBACK_DAYS)).timestamp();
        let activities = self
            .api
            .list_activities(&access_token, after, PAGE_SIZE)
            .await?;

        if activities.len() >= PAGE_SIZE as usize {
            // Full page: anything past the cap inside the window is skipped.
            tracing::warn!(user_id, page_size = PAGE_SIZE, "Activity page full");
        }

        self.reconcile(user_id, activities).await
    }

    /// Return a usable access token, rotating the credential if expired.
    ///
    /// The rotated credential is persisted as a full replacement before the
    /// token is used; no second expiry check happens within one sync.
    async fn ensure_fresh_token(&self, credential: Credential) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        if !credential.is_expired(now) {
            return Ok(credential.access_token);
        }

        tracing::info!(user_id = %credential.user_id, "Access token expired, refreshing");

        // A rejected refresh grant means the refresh token itself is bad;
        // retrying won't help, only re-linking will.
        let refreshed = self
            .api
            .refresh_token(&credential.refresh_token)
            .await
            .map_err(|e| match e {
                AppError::ProviderRejected(detail) => AppError::ProviderRejected(format!(
                    "Token refresh rejected ({}); reconnect your Strava account",
                    detail
                )),
                other => other,
            })?;

        let rotated = Credential {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token,
            expires_at: refreshed.expires_at,
            updated_at: Utc::now().to_rfc3339(),
            ..credential
        };

        self.store.upsert_credential(&rotated).await?;

        tracing::info!(user_id = %rotated.user_id, "Credential rotated");
        Ok(rotated.access_token)
    }

    /// Upsert each remote activity, one at a time, absorbing partial failure.
    async fn reconcile(
        &self,
        user_id: &str,
        remote: Vec<StravaActivitySummary>,
    ) -> Result<SyncReport, AppError> {
        let mut tally = SyncTally::new(remote.len() as u32);

        for summary in remote {
            let activity = map_activity(user_id, summary);
            match self.store.upsert_activity(&activity).await {
                Ok(()) => tally.record_ok(),
                Err(e) => tally.record_err(activity.strava_activity_id, &e),
            }
        }

        tally.into_report(user_id)
    }
}

/// Map a remote activity summary onto the stored schema.
fn map_activity(user_id: &str, summary: StravaActivitySummary) -> Activity {
    let average_pace = average_pace_secs_per_km(summary.distance, summary.moving_time);

    Activity {
        user_id: user_id.to_string(),
        strava_activity_id: summary.id,
        name: summary.name,
        sport_type: summary.sport_type,
        distance_meters: summary.distance,
        moving_time_secs: summary.moving_time,
        elapsed_time_secs: summary.elapsed_time,
        elevation_gain_meters: summary.total_elevation_gain,
        average_heartrate: summary.average_heartrate,
        start_date: summary.start_date,
        average_pace_secs_per_km: average_pace,
        source: SOURCE_STRAVA.to_string(),
    }
}

/// Result of a sync.
#[derive(Debug)]
pub struct SyncReport {
    pub synced: u32,
    pub total: u32,
}

/// Running result of the reconciliation loop.
///
/// Partial failure is absorbed: the report still succeeds as long as at least
/// one record (or none at all) was written. Only total failure of a non-empty
/// batch escalates, carrying the first failure's message.
struct SyncTally {
    total: u32,
    synced: u32,
    first_error: Option<String>,
    sampled_errors: Vec<String>,
}

impl SyncTally {
    fn new(total: u32) -> Self {
        Self {
            total,
            synced: 0,
            first_error: None,
            sampled_errors: Vec::new(),
        }
    }

    fn record_ok(&mut self) {
        self.synced += 1;
    }

    fn record_err(&mut self, activity_id: u64, error: &AppError) {
        let message = error.to_string();
        tracing::warn!(activity_id, error = %message, "Activity upsert failed");

        if self.first_error.is_none() {
            self.first_error = Some(message);
        } else if self.sampled_errors.len() < FAILURE_SAMPLE_LIMIT {
            self.sampled_errors.push(message);
        }
    }

    fn into_report(self, user_id: &str) -> Result<SyncReport, AppError> {
        if self.total > 0 && self.synced == 0 {
            let first = self
                .first_error
                .unwrap_or_else(|| "all activity writes failed".to_string());
            tracing::error!(user_id, total = self.total, "Every activity upsert failed");
            return Err(AppError::Database(first));
        }

        let failed = self.total - self.synced;
        if failed > 0 {
            tracing::warn!(
                user_id,
                synced = self.synced,
                failed,
                sampled = ?self.sampled_errors,
                "Sync completed with partial failures"
            );
        }

        Ok(SyncReport {
            synced: self.synced,
            total: self.total,
        })
    }
}
