// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: deterministic fakes for the Strava API and the
//! store, plus a router builder wired up with them.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use stride_sync::config::Config;
use stride_sync::db::Store;
use stride_sync::error::AppError;
use stride_sync::models::{Activity, Credential};
use stride_sync::routes::create_router;
use stride_sync::services::strava::{
    StravaActivitySummary, StravaApi, StravaAthlete, TokenExchangeResponse, TokenRefreshResponse,
};
use stride_sync::services::{LinkService, SyncService};
use stride_sync::AppState;

/// Athlete ID returned by the fake exchange.
#[allow(dead_code)]
pub const TEST_ATHLETE_ID: u64 = 4242;

/// Ordered log of collaborator calls, shared between fakes.
pub type EventLog = Arc<Mutex<Vec<String>>>;

#[allow(dead_code)]
pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

// ─── Fake Strava API ─────────────────────────────────────────

/// Programmable in-memory `StravaApi`.
#[derive(Default)]
pub struct FakeStrava {
    events: EventLog,
    /// Activities returned by `list_activities`.
    pub activities: Mutex<Vec<StravaActivitySummary>>,
    /// When set, `exchange_code` fails with this rejection detail.
    pub exchange_rejection: Mutex<Option<String>>,
    /// When set, `refresh_token` fails with this rejection detail.
    pub refresh_rejection: Mutex<Option<String>>,
    /// When set, `list_activities` fails as unavailable with this message.
    pub activities_unavailable: Mutex<Option<String>>,
    /// Number of exchange calls made (also salts the minted tokens).
    pub exchange_calls: Mutex<u32>,
    /// Number of refresh calls made.
    pub refresh_calls: Mutex<u32>,
}

#[allow(dead_code)]
impl FakeStrava {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    fn log(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }
}

#[async_trait]
impl StravaApi for FakeStrava {
    async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        self.log(&format!("exchange_code:{}", code));

        if let Some(detail) = self.exchange_rejection.lock().unwrap().clone() {
            return Err(AppError::ProviderRejected(detail));
        }

        let mut calls = self.exchange_calls.lock().unwrap();
        *calls += 1;
        let n = *calls;

        Ok(TokenExchangeResponse {
            access_token: format!("access-token-{}", n),
            refresh_token: format!("refresh-token-{}", n),
            expires_at: now_epoch() + 6 * 3600,
            athlete: StravaAthlete {
                id: TEST_ATHLETE_ID,
            },
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse, AppError> {
        self.log(&format!("refresh_token:{}", refresh_token));
        *self.refresh_calls.lock().unwrap() += 1;

        if let Some(detail) = self.refresh_rejection.lock().unwrap().clone() {
            return Err(AppError::ProviderRejected(detail));
        }

        Ok(TokenRefreshResponse {
            access_token: "rotated-access".to_string(),
            refresh_token: "rotated-refresh".to_string(),
            expires_at: now_epoch() + 6 * 3600,
        })
    }

    async fn list_activities(
        &self,
        access_token: &str,
        _after: i64,
        _per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>, AppError> {
        self.log(&format!("list_activities:{}", access_token));

        if let Some(message) = self.activities_unavailable.lock().unwrap().clone() {
            return Err(AppError::ProviderUnavailable(message));
        }

        Ok(self.activities.lock().unwrap().clone())
    }
}

// ─── Fake store ──────────────────────────────────────────────

/// In-memory `Store` with injectable write failures.
#[derive(Default)]
pub struct FakeStore {
    events: EventLog,
    pub credentials: Mutex<HashMap<String, Credential>>,
    pub activities: Mutex<HashMap<u64, Activity>>,
    /// Activity IDs whose upserts fail.
    pub fail_activity_ids: Mutex<HashSet<u64>>,
    /// When true, every activity upsert fails.
    pub fail_all_activities: Mutex<bool>,
    /// When true, credential upserts fail.
    pub fail_credential_upserts: Mutex<bool>,
}

#[allow(dead_code)]
impl FakeStore {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    fn log(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }

    pub fn insert_credential(&self, credential: Credential) {
        self.credentials
            .lock()
            .unwrap()
            .insert(credential.user_id.clone(), credential);
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn get_credential(&self, user_id: &str) -> Result<Option<Credential>, AppError> {
        Ok(self.credentials.lock().unwrap().get(user_id).cloned())
    }

    async fn upsert_credential(&self, credential: &Credential) -> Result<(), AppError> {
        self.log(&format!("upsert_credential:{}", credential.access_token));
        if *self.fail_credential_upserts.lock().unwrap() {
            return Err(AppError::Database(
                "simulated credential write failure".to_string(),
            ));
        }
        self.credentials
            .lock()
            .unwrap()
            .insert(credential.user_id.clone(), credential.clone());
        Ok(())
    }

    async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        let id = activity.strava_activity_id;
        self.log(&format!("upsert_activity:{}", id));

        let fail = *self.fail_all_activities.lock().unwrap()
            || self.fail_activity_ids.lock().unwrap().contains(&id);
        if fail {
            return Err(AppError::Database(format!(
                "simulated write failure for activity {}",
                id
            )));
        }

        self.activities.lock().unwrap().insert(id, activity.clone());
        Ok(())
    }
}

// ─── App + auth helpers ──────────────────────────────────────

/// Build the real router over the given fakes.
#[allow(dead_code)]
pub fn create_test_app(api: Arc<FakeStrava>, store: Arc<FakeStore>) -> (axum::Router, Vec<u8>) {
    let config = Config::test_default();
    let signing_key = config.jwt_signing_key.clone();

    let link_service = LinkService::new(api.clone(), store.clone());
    let sync_service = SyncService::new(api, store);

    let state = Arc::new(AppState {
        config,
        link_service,
        sync_service,
    });

    (create_router(state), signing_key)
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Current Unix time in seconds.
#[allow(dead_code)]
pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// A stored credential for `user_id` expiring at `expires_at`.
#[allow(dead_code)]
pub fn test_credential(user_id: &str, expires_at: i64) -> Credential {
    Credential {
        user_id: user_id.to_string(),
        athlete_id: TEST_ATHLETE_ID,
        access_token: "stored-access".to_string(),
        refresh_token: "stored-refresh".to_string(),
        expires_at,
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

/// A remote activity summary with the given ID.
#[allow(dead_code)]
pub fn test_summary(id: u64) -> StravaActivitySummary {
    StravaActivitySummary {
        id,
        name: format!("Activity {}", id),
        sport_type: "Run".to_string(),
        distance: 5000.0,
        moving_time: 1500,
        elapsed_time: 1560,
        total_elevation_gain: 42.0,
        average_heartrate: Some(148.0),
        start_date: "2026-07-01T06:30:00Z".to_string(),
    }
}
