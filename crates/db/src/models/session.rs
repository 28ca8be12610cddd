//! Anonymous playground session model.

use barberlab_core::session::is_active;
use barberlab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `playground_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaygroundSession {
    pub id: DbId,
    pub token: String,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
    pub last_seen_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub selfie_path: Option<String>,
    pub selfie_uploaded_at: Option<Timestamp>,
    pub generation_count: i32,
    pub last_generation_at: Option<Timestamp>,
    pub last_ip: String,
    pub user_agent: String,
}

impl PlaygroundSession {
    /// Active means not revoked and not past expiry.
    pub fn is_active(&self, now: Timestamp) -> bool {
        is_active(self.revoked_at, self.expires_at, now)
    }

    pub fn has_selfie(&self) -> bool {
        self.selfie_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// DTO for creating a session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub token: String,
    pub expires_at: Timestamp,
    pub last_ip: String,
    pub user_agent: String,
}
