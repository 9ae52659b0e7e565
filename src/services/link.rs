// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! First-time account linking: authorization-code exchange.

use std::sync::Arc;

use crate::db::Store;
use crate::error::AppError;
use crate::models::Credential;
use crate::services::strava::StravaApi;

/// Exchanges an authorization code for tokens and stores the credential.
#[derive(Clone)]
pub struct LinkService {
    api: Arc<dyn StravaApi>,
    store: Arc<dyn Store>,
}

impl LinkService {
    pub fn new(api: Arc<dyn StravaApi>, store: Arc<dyn Store>) -> Self {
        Self { api, store }
    }

    /// Link the user's account to Strava.
    ///
    /// The resulting credential fully replaces any previous one for this
    /// user, so re-linking rotates tokens rather than accumulating rows.
    pub async fn link(&self, user_id: &str, code: &str) -> Result<LinkOutcome, AppError> {
        let token = self.api.exchange_code(code).await?;

        let credential = Credential {
            user_id: user_id.to_string(),
            athlete_id: token.athlete.id,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token.expires_at,
            updated_at: chrono::Utc::now().to_rfc3339(),
        };

        self.store.upsert_credential(&credential).await?;

        tracing::info!(
            user_id,
            athlete_id = credential.athlete_id,
            "Strava account linked"
        );

        Ok(LinkOutcome {
            athlete_id: credential.athlete_id,
        })
    }
}

/// Result of a successful link.
#[derive(Debug)]
pub struct LinkOutcome {
    pub athlete_id: u64,
}
