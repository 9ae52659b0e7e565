// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model for storage and API.

use serde::{Deserialize, Serialize};

/// Stored activity record in Firestore.
///
/// Keyed by the Strava activity ID, so re-syncing the same activity
/// overwrites all fields rather than creating a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Our user ID (owner)
    pub user_id: String,
    /// Strava activity ID (also used as document ID)
    pub strava_activity_id: u64,
    /// Activity name/title
    pub name: String,
    /// Sport type (Ride, Run, Hike, etc.)
    pub sport_type: String,
    /// Distance in meters
    pub distance_meters: f64,
    /// Moving time in seconds
    pub moving_time_secs: i64,
    /// Elapsed time in seconds
    pub elapsed_time_secs: i64,
    /// Total elevation gain in meters
    pub elevation_gain_meters: f64,
    /// Average heart rate, if recorded
    pub average_heartrate: Option<f64>,
    /// Start date/time (ISO 8601)
    pub start_date: String,
    /// Average pace in seconds per kilometer (None when distance is zero)
    pub average_pace_secs_per_km: Option<f64>,
    /// Source tag: "strava"
    pub source: String,
}

/// Average pace in seconds per kilometer.
///
/// Undefined for zero-distance activities (e.g. indoor rowing without GPS).
pub fn average_pace_secs_per_km(distance_meters: f64, moving_time_secs: i64) -> Option<f64> {
    if distance_meters > 0.0 {
        Some(moving_time_secs as f64 / (distance_meters / 1000.0))
    } else {
        None
    }
}
