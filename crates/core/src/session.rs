//! Session identity and lifecycle predicates.

use rand::Rng;

use crate::types::Timestamp;

/// Length of the opaque session token (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 43;

/// Generate a new random session token.
pub fn new_session_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// A session is active iff it has not been revoked and has not expired.
pub fn is_active(revoked_at: Option<Timestamp>, expires_at: Timestamp, now: Timestamp) -> bool {
    revoked_at.is_none() && expires_at > now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn tokens_are_unique_and_sized() {
        let a = new_session_token();
        let b = new_session_token();
        assert_eq!(a.len(), TOKEN_LENGTH);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn active_until_expiry() {
        let now = Utc::now();
        assert!(is_active(None, now + Duration::minutes(30), now));
        // Exactly at expiry or one second past, the session is dead.
        assert!(!is_active(None, now, now));
        assert!(!is_active(None, now - Duration::seconds(1), now));
    }

    #[test]
    fn revoked_sessions_are_inactive() {
        let now = Utc::now();
        assert!(!is_active(
            Some(now - Duration::minutes(1)),
            now + Duration::minutes(30),
            now
        ));
    }
}
