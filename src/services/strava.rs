// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for OAuth token grants and activity listing.
//!
//! Handles:
//! - Authorization-code exchange (first-time link)
//! - Refresh-token grant (token rotation)
//! - Activity listing for the sync window
//! - Normalization of Strava's structured error bodies

use crate::config::Config;
use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;

/// Capability interface over the Strava API.
///
/// The link and sync services depend on this trait rather than on the
/// concrete client, so tests can substitute deterministic fakes instead of
/// live network calls.
#[async_trait]
pub trait StravaApi: Send + Sync {
    /// Exchange an authorization code for tokens (first-time link).
    async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError>;

    /// Rotate an expired access token via the refresh grant.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse, AppError>;

    /// List activities started after `after` (Unix seconds). Single page.
    async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>, AppError>;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_base: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client from application config.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.strava_api_base.clone(),
            token_url: config.strava_token_url.clone(),
            client_id: config.strava_client_id.clone(),
            client_secret: config.strava_client_secret.clone(),
        }
    }

    /// POST to the token endpoint and parse the response as `T`.
    ///
    /// A non-success status is a structured rejection of the grant itself
    /// (bad code, revoked refresh token), not an availability problem.
    async fn token_grant<T: for<'de> Deserialize<'de>>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Strava token grant rejected");
            return Err(AppError::ProviderRejected(rejection_detail(&body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ProviderContract(format!("Token response parse error: {}", e)))
    }
}

#[async_trait]
impl StravaApi for StravaClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        self.token_grant(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse, AppError> {
        self.token_grant(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        per_page: u32,
    ) -> Result<Vec<StravaActivitySummary>, AppError> {
        let url = format!("{}/athlete/activities", self.api_base);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ProviderUnavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_detail(&body)
            )));
        }

        // Strava reports success with a JSON array; anything else means the
        // response contract was broken even though the HTTP layer said OK.
        let body = response
            .text()
            .await
            .map_err(|e| AppError::ProviderUnavailable(e.to_string()))?;

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            AppError::ProviderContract(format!("Activities response parse error: {}", e))
        })?;

        if !value.is_array() {
            return Err(AppError::ProviderContract(
                "Activities response was not a list".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| {
            AppError::ProviderContract(format!("Activities response parse error: {}", e))
        })
    }
}

/// Build a human-readable detail string from a token-endpoint rejection body.
///
/// Strava reports grant failures as `{"message": ..., "errors": [{"resource",
/// "field", "code"}]}`. Joins the field/code pairs when present, falls back to
/// the top-level message, then to "unknown error".
fn rejection_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return "unknown error".to_string();
    };

    if let Some(errors) = value.get("errors").and_then(|e| e.as_array()) {
        let pairs: Vec<String> = errors
            .iter()
            .filter_map(|err| {
                let field = err.get("field").and_then(|f| f.as_str())?;
                let code = err.get("code").and_then(|c| c.as_str())?;
                Some(format!("{} {}", field, code))
            })
            .collect();
        if !pairs.is_empty() {
            return pairs.join(", ");
        }
    }

    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        if !message.is_empty() {
            return message.to_string();
        }
    }

    "unknown error".to_string()
}

/// Extract an error detail from a non-success API response body.
///
/// Prefers a structured `message` or `error` field, falls back to the raw
/// body text.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(|m| m.as_str()) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    body.to_string()
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub athlete: StravaAthlete,
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
}

/// Summary activity from the list endpoint.
///
/// Strava omits fields depending on the activity type and recording device,
/// so everything beyond the ID is defaulted rather than required.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sport_type: String,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub moving_time: i64,
    #[serde(default)]
    pub elapsed_time: i64,
    #[serde(default)]
    pub total_elevation_gain: f64,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub start_date: String,
}
