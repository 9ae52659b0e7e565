//! Strava OAuth credential model.

use serde::{Deserialize, Serialize};

/// A user's Strava OAuth credential, stored in Firestore.
///
/// One document per user (document ID = user ID). Every successful code
/// exchange or token refresh replaces the whole document; fields are never
/// updated individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Our user ID (also used as document ID)
    pub user_id: String,
    /// Strava athlete ID
    pub athlete_id: u64,
    /// OAuth access token
    pub access_token: String,
    /// OAuth refresh token
    pub refresh_token: String,
    /// When the access token expires (Unix seconds)
    pub expires_at: i64,
    /// When this credential was last written (ISO 8601)
    pub updated_at: String,
}

impl Credential {
    /// Whether the access token has expired as of `now` (Unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_at: i64) -> Credential {
        Credential {
            user_id: "user-1".to_string(),
            athlete_id: 42,
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_is_expired() {
        let cred = credential(1_000);
        assert!(!cred.is_expired(999));
        assert!(cred.is_expired(1_000));
        assert!(cred.is_expired(1_001));
    }
}
