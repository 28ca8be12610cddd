//! Append-only rate-limit event model.

use barberlab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `rate_limit_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RateLimitEvent {
    pub id: DbId,
    pub action: String,
    pub ip_address: String,
    pub session_id: Option<DbId>,
    pub created_at: Timestamp,
}
