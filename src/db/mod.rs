//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{Activity, Credential};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const CREDENTIALS: &str = "strava_credentials";
    pub const ACTIVITIES: &str = "activities";
}

/// Persistent store for credentials and activities.
///
/// Both collections are written with keyed upserts so repeated application is
/// idempotent. Tests substitute an in-memory implementation.
#[async_trait]
pub trait Store: Send + Sync {
    /// Point lookup of a user's Strava credential.
    async fn get_credential(&self, user_id: &str) -> Result<Option<Credential>, AppError>;

    /// Insert or fully replace a user's Strava credential.
    async fn upsert_credential(&self, credential: &Credential) -> Result<(), AppError>;

    /// Insert or fully replace an activity, keyed by its Strava activity ID.
    async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError>;
}
